//! Pieces shared by every packet kind: the root/framing layout table,
//! bounds-checked reader, zero-filled writer, byte helpers and errors.

pub mod bytes;
pub mod cid;
pub mod error;
pub mod header;
pub mod layout;
pub mod reader;
pub mod writer;
