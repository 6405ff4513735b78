// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - backend access layer.

pub mod channel;
pub mod gateway;
pub mod operations;
pub mod reconnect;

pub use channel::{ChannelEvent, LifecycleEvent, LifecycleHandle, LiveChannel, Subscription};
pub use gateway::{Gateway, ResponseEnvelope};
pub use operations::{OperationKind, OperationSpec};
pub use reconnect::{ClientClass, ReconnectProfile};
