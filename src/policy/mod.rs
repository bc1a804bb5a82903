//! Policy objects as delivered by a GPO, and their translation to Linux terms.
pub mod action;
pub mod folder;
pub mod shortcut;
pub mod windows;
