//! itinerary-planner: day-by-day travel itineraries from a generative model
//!
//! The planner sends a destination and a day count to Gemini together with a
//! response schema, then decodes the reply into a strongly typed [`Itinerary`].
//! Every outcome resolves to data or to a caller-safe [`ErrorMessage`].
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use itinerary_planner::ItineraryPlanner;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let planner = ItineraryPlanner::from_env()?;
//!
//!     match planner.generate("Paris, France", 3).await {
//!         Ok(itinerary) => {
//!             for day in itinerary.iter() {
//!                 println!("{}: {}", day.day, day.morning);
//!             }
//!         }
//!         Err(message) => eprintln!("{}", message),
//!     }
//!     Ok(())
//! }
//! ```

extern crate self as itinerary_planner;

pub mod core;
pub mod error;
pub mod schemas;
pub mod services;
pub mod types;

pub use core::{ItineraryPlanner, PlannerConfig};
pub use error::{ErrorMessage, FailureKind, PlannerError, Result};
pub use itinerary_macros::structured_output;
pub use schemas::{SchemaHandle, StructuredOutput, TextFields};
pub use services::{ContentGenerator, GeminiClient, GenerateContentRequest, GenerateContentResponse};
pub use types::{decode_itinerary, Itinerary, ItineraryDay, ItineraryRequest};

pub use schemas as schema;

#[cfg(feature = "cli")]
pub mod cli;
