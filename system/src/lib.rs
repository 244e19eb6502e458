mod canvas;
mod message;
mod replica;
mod shape;
mod traits;

pub use canvas::*;
pub use message::*;
pub use replica::*;
pub use shape::*;
pub use traits::*;

pub extern crate bincode;
pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;
