// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::match_same_arms,
        clippy::needless_pass_by_value,
        clippy::needless_collect,
        clippy::option_if_let_else,
        clippy::default_trait_access,
        clippy::items_after_statements,
        clippy::or_fun_call
    )
)]

//! Trade Executor - Rust Core Library
//!
//! Turns a confirmed batch of long equity trade plans into broker actions:
//! a market buy, a monitored fill and a stop-loss/target GTT protecting the
//! position.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic (pure, no I/O)
//!   - `market_hours`: Exchange trading window gate
//!   - `position_sizing`: Proposal normalization, risk sizing, exposure scaling
//!   - `protection`: Tagged stop-loss/target contingent orders
//!   - `trade_lifecycle`: Lifecycle phases, events, execution records
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: `BrokerGateway`, `ExecutionObserver`, `ExecutionStorePort`, `ClockPort`
//!   - `services`: `ContingentOrderPlacer`
//!   - `use_cases`: `TradeLifecycleOrchestrator`, `BatchExecutionUseCase`
//!   - `dto`: Prepared batches and status reports
//!
//! - **Infrastructure**: Adapters (implementations)
//!   - `broker`: Kite Connect adapter
//!   - `persistence`: In-memory batch and event store
//!   - `observers`: Store-backed event observer with live broadcast
//!
//! - **Config**: YAML configuration with environment interpolation
//! - **Observability**: Prometheus metrics

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// Configuration loading and validation.
pub mod config;

/// Metrics instrumentation.
pub mod observability;

// =============================================================================
// Re-exports from Clean Architecture
// =============================================================================

// Domain re-exports
pub use domain::market_hours::{MarketHoursConfig, MarketHoursGate, MarketSession};
pub use domain::position_sizing::{
    ExposureScaler, PortfolioMetrics, RiskSizer, SizedPlan, TradePlan, TradeProposal,
};
pub use domain::protection::{ContingentLeg, ContingentOrder, ContingentOrderBuilder, LegKind};
pub use domain::shared::{BrokerOrderId, ContingentOrderId, CorrelationId, DomainError, Symbol};
pub use domain::trade_lifecycle::{
    ExecutionEvent, ExecutionRecord, FailureKind, LifecycleError, LifecyclePhase,
};

// Application re-exports
pub use application::dto::{BatchStatusReport, PreparedBatch, QuantityOverride};
pub use application::ports::{
    BrokerError, BrokerGateway, ExecutionContext, ExecutionObserver, ExecutionStorePort,
    NoOpObserver, SessionCredential,
};
pub use application::services::ContingentOrderPlacer;
pub use application::use_cases::{
    BatchError, BatchExecutionUseCase, BatchSettings, LifecycleSettings,
    TradeLifecycleOrchestrator,
};

// Infrastructure re-exports
pub use infrastructure::broker::kite::{KiteBrokerAdapter, KiteConfig, KiteError};
pub use infrastructure::observers::StoreObserver;
pub use infrastructure::persistence::InMemoryExecutionStore;
