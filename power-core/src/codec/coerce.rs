//! Text to typed value coercion.
//!
//! Type-directed parsing of raw attribute text. Numbers follow Rust's strict
//! `str::parse` grammar; enums and allow-lists match case-sensitively while
//! bool tokens match case-insensitively.

use crate::constants::{HAND_TOKEN, LIST_SEPARATOR, NULL_TOKEN};
use crate::error::{NumberKind, PowerError};
use crate::resource::{resolve, ResourceCategory};
use crate::schema::AttributeDescriptor;
use crate::trigger::TriggerTag;
use crate::value::{AttributeKind, AttributeValue, ScalarKind, ScalarValue};

use super::CodecContext;

/// Where the raw text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    /// Typed by a sender; boolean-choice tokens apply
    Command,
    /// Read back from a saved document, where bools are stored as bools
    Document,
}

/// Result of a successful coercion
#[derive(Debug, Clone, PartialEq)]
pub enum Coercion {
    /// Store `value` (`None` = unset). `ignored` lists unknown trigger names.
    Assign {
        value: Option<AttributeValue>,
        ignored: Vec<String>,
    },
    /// A custom decoder chose to leave the attribute as it is
    Unchanged,
}

impl Coercion {
    fn assign(value: Option<AttributeValue>) -> Self {
        Coercion::Assign {
            value,
            ignored: Vec::new(),
        }
    }
}

/// Split on the list separator, trim tokens and drop empty ones
pub fn split_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Coerce text typed by `ctx.sender` into a value for `descriptor`
pub fn coerce<M>(
    raw: &str,
    descriptor: &AttributeDescriptor<M>,
    instance: &M,
    ctx: &CodecContext<'_>,
) -> Result<Coercion, PowerError> {
    coerce_from(Origin::Command, raw, descriptor, instance, ctx)
}

pub(crate) fn coerce_from<M>(
    origin: Origin,
    raw: &str,
    descriptor: &AttributeDescriptor<M>,
    instance: &M,
    ctx: &CodecContext<'_>,
) -> Result<Coercion, PowerError> {
    if raw == NULL_TOKEN {
        return Ok(Coercion::assign(None));
    }

    if let Some(decode) = descriptor.decoder() {
        return match decode(instance, raw) {
            Ok(Some(value)) => Ok(Coercion::assign(Some(value))),
            Ok(None) => Ok(Coercion::Unchanged),
            Err(message) => Err(PowerError::InvalidValue {
                attribute: descriptor.name().to_string(),
                message,
            }),
        };
    }

    let choice = match origin {
        Origin::Command => descriptor.boolean_tokens(),
        Origin::Document => None,
    };

    match descriptor.kind() {
        AttributeKind::Scalar(kind) => {
            let value = coerce_scalar(raw, kind, descriptor.name(), choice, ctx)?;
            Ok(Coercion::assign(Some(AttributeValue::Scalar(value))))
        }
        AttributeKind::List(kind) | AttributeKind::Set(kind) => {
            let (items, ignored) = if kind == ScalarKind::Trigger {
                let (valid, ignored) = ctx.triggers.partition_valid(split_tokens(raw));
                (valid.into_iter().map(ScalarValue::Trigger).collect(), ignored)
            } else {
                let items = split_tokens(raw)
                    .map(|token| coerce_scalar(token, kind, descriptor.name(), choice, ctx))
                    .collect::<Result<Vec<_>, _>>()?;
                (items, Vec::new())
            };
            let value = match (items.is_empty(), descriptor.kind()) {
                (true, _) => None,
                (false, AttributeKind::Set(_)) => Some(AttributeValue::set(items)),
                (false, _) => Some(AttributeValue::List(items)),
            };
            Ok(Coercion::Assign { value, ignored })
        }
    }
}

/// Coerce a single token as one scalar element
pub fn coerce_scalar(
    raw: &str,
    kind: ScalarKind,
    attribute: &str,
    boolean_tokens: Option<(&'static str, &'static str)>,
    ctx: &CodecContext<'_>,
) -> Result<ScalarValue, PowerError> {
    let invalid_number = |kind: NumberKind| PowerError::InvalidNumber {
        attribute: attribute.to_string(),
        kind,
        value: raw.to_string(),
    };

    match kind {
        ScalarKind::Bool => {
            let (true_token, false_token) = boolean_tokens.unwrap_or(("true", "false"));
            if raw.eq_ignore_ascii_case(true_token) {
                Ok(ScalarValue::Bool(true))
            } else if raw.eq_ignore_ascii_case(false_token) {
                Ok(ScalarValue::Bool(false))
            } else {
                Err(PowerError::InvalidOption {
                    attribute: attribute.to_string(),
                    value: raw.to_string(),
                    allowed: vec![false_token.to_string(), true_token.to_string()],
                })
            }
        }
        ScalarKind::Int32 => raw
            .parse()
            .map(ScalarValue::Int32)
            .map_err(|_| invalid_number(NumberKind::Int32)),
        ScalarKind::Int64 => raw
            .parse()
            .map(ScalarValue::Int64)
            .map_err(|_| invalid_number(NumberKind::Int64)),
        // `inf` and `NaN` parse but cannot be stored in a document
        ScalarKind::Float32 => raw
            .parse::<f32>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ScalarValue::Float32)
            .ok_or_else(|| invalid_number(NumberKind::Float32)),
        ScalarKind::Float64 => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(ScalarValue::Float64)
            .ok_or_else(|| invalid_number(NumberKind::Float64)),
        ScalarKind::String => Ok(ScalarValue::String(raw.to_string())),
        ScalarKind::Enum(members) => members
            .iter()
            .find(|member| **member == raw)
            .map(|member| ScalarValue::Enum(*member))
            .ok_or_else(|| PowerError::InvalidEnum {
                attribute: attribute.to_string(),
                value: raw.to_string(),
                allowed: members.iter().map(|m| m.to_string()).collect(),
            }),
        ScalarKind::Resource(category) => {
            if category == ResourceCategory::Item && raw.eq_ignore_ascii_case(HAND_TOKEN) {
                return ctx
                    .sender
                    .held_item()
                    .map(ScalarValue::Resource)
                    .ok_or_else(|| PowerError::NoItemInHand {
                        attribute: attribute.to_string(),
                    });
            }
            resolve(ctx.resolver, category, raw, ctx.default_namespace)
                .map(ScalarValue::Resource)
                .ok_or_else(|| PowerError::UnresolvedResource {
                    attribute: attribute.to_string(),
                    value: raw.to_string(),
                })
        }
        ScalarKind::Trigger => {
            if ctx.triggers.contains(raw) {
                Ok(ScalarValue::Trigger(TriggerTag::new(raw)))
            } else {
                Err(PowerError::InvalidOption {
                    attribute: attribute.to_string(),
                    value: raw.to_string(),
                    allowed: ctx.triggers.names(),
                })
            }
        }
    }
}
