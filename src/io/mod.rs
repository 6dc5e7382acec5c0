// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: the backend REST clients, image loading and background jobs.

pub mod api;
pub mod media;
pub mod store;
pub mod stream;
pub mod tasks;
