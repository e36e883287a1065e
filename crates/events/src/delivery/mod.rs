//! External delivery channels for catalog events.

pub mod webhook;
