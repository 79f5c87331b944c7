//! The library code for `bilingo`, a companion tool for a bilingual
//! (Vietnamese/English) static blog. It has two independent halves.
//!
//! The first is the series page generator:
//!
//! 1. Loading series records from the data file ([`crate::series`])
//! 2. Rendering one page per series through the theme's template
//!    ([`crate::write`])
//!
//! [`crate::build`] stitches these together with the project configuration
//! ([`crate::config`]) and copies the theme's static assets.
//!
//! The second is the language filter that runs against a rendered post
//! listing. [`crate::filter`] holds the decisions (which posts are visible,
//! whether the "no results" banner is due, which pagination links survive)
//! as pure functions. [`crate::controller::Controller`] applies them to a
//! [`crate::document::Surface`], reading and writing the reader's preference
//! through a [`crate::preference::PreferenceStore`] and probing adjacent
//! listing pages through a [`crate::probe::PageFetcher`].

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod controller;
pub mod document;
pub mod filter;
pub mod href;
pub mod language;
pub mod logging;
pub mod markdown;
pub mod preference;
pub mod probe;
pub mod series;
pub mod value;
pub mod write;
