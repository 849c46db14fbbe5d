/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Floor;

/**
 * Errors raised by the elevator core.
 *
 * Both variants are policy violations and deterministic functions of the input,
 * so none of them are worth retrying. Callers branch on the variant.
 *
 * # Variants
 * - `Domain`:  Duplicate id, unknown id, floor already scheduled, floor not scheduled
 *              or an invalid floor range at construction.
 * - `Range`:   A target or current floor outside `[lowest, highest]`.
 */
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElevatorError {
    #[error("{0}")]
    Domain(String),

    #[error("Value: {value} is out of range of possible elevator target floors [{lowest}, {highest}]")]
    Range {
        value: Floor,
        lowest: Floor,
        highest: Floor,
    },
}

pub type ElevatorResult<T> = std::result::Result<T, ElevatorError>;
