//! External delivery channels for platform notifications.
//!
//! Email is the only outbound channel; the notification dispatcher in the
//! API crate resolves recipients and hands events off to [`email`].

pub mod email;
