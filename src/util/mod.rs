// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Utilities shared across the application.

pub mod geometry;
pub mod timer;
