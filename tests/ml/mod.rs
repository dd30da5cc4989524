//! Tests for ML artifact ingestion and its effect on analytics.

mod history;
