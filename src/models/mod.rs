// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Board data model: drawables, the scene that owns them, and configuration.

pub mod config;
pub mod drawable;
pub mod scene;
