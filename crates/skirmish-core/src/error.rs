//! Error kinds produced by the simulation core.
//!
//! Per the core's error-handling design, stochastic and gameplay failures
//! (invalid transitions, out-of-range attacks, missing targets) are not
//! represented here -- they resolve to ordinary return values (a miss, an
//! abandoned attack, a logged-and-skipped action). This enum covers only the
//! failure modes that must surface to the caller: resource exhaustion and
//! malformed configuration.

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// The entity store could not allocate another character or unit id.
    #[error("entity id space exhausted")]
    EntityIdsExhausted,

    /// The scheduler could not accept another event (insertion counter
    /// overflow). In practice unreachable before the heat death of the
    /// universe, but modeled per the "Fatal" row of the error design.
    #[error("event scheduler insertion counter overflowed")]
    SchedulerOverflow,

    /// Raised by [`crate::rng::RandomProvider::set_seed`] when a seed is set
    /// after randomness has already been consumed. Not fatal -- logged via
    /// `tracing::warn!` by the caller -- but callers that want to treat this
    /// as hard failure (e.g. deterministic test harnesses) can match on it.
    #[error("seed set at tick {tick} after {draws} random draws were already consumed")]
    SeedSetAfterUse { tick: u64, draws: u64 },

    /// A character id referenced by a configuration or scenario file does not
    /// exist in the entity store.
    #[error("unknown character id {0}")]
    UnknownCharacter(i64),

    /// A unit id referenced by a configuration or scenario file does not
    /// exist in the entity store.
    #[error("unknown unit id {0}")]
    UnknownUnit(i64),
}

pub type SimResult<T> = Result<T, SimError>;
