// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model shared by the engine, the session controller and the UI.

pub mod overlay;
pub mod session;
