// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for Overlay Deck.

pub mod canvas;
pub mod images;
pub mod notices;
pub mod properties;
pub mod toolbar;
