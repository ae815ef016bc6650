//! Internal building blocks (the content-addressed object model) that power
//! the public store, snapshot, and recorder APIs.

pub mod object;
