//! Named validator and adapter strategies, resolved once at startup into the
//! immutable chains the dispatcher owns.

use std::str::FromStr;

use crate::adapters::{Adapter, AdapterChain, ChaosAdapter, ExpireAdapter, ReconnectAdapter};
use crate::error::{EngineError, Result};
use crate::validators::{
    ClientIdValidator, RequestValidator, RequiredFieldsValidator, Validator, ValidatorChain,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorKind {
    Request,
    RequiredFields,
    ClientId,
}

impl ValidatorKind {
    pub const ALL: [Self; 3] = [Self::Request, Self::RequiredFields, Self::ClientId];

    pub fn name(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::RequiredFields => "required_fields",
            Self::ClientId => "client_id",
        }
    }

    pub fn build(self) -> Box<dyn Validator> {
        match self {
            Self::Request => Box::new(RequestValidator),
            Self::RequiredFields => Box::new(RequiredFieldsValidator),
            Self::ClientId => Box::new(ClientIdValidator),
        }
    }
}

impl FromStr for ValidatorKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| EngineError::UnknownValidator(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    Expire,
    Reconnect,
    Chaos,
}

impl AdapterKind {
    pub const ALL: [Self; 3] = [Self::Expire, Self::Reconnect, Self::Chaos];

    pub fn name(self) -> &'static str {
        match self {
            Self::Expire => "expire",
            Self::Reconnect => "reconnect",
            Self::Chaos => "chaos",
        }
    }

    pub fn build(self) -> Box<dyn Adapter> {
        match self {
            Self::Expire => Box::new(ExpireAdapter),
            Self::Reconnect => Box::new(ReconnectAdapter),
            Self::Chaos => Box::new(ChaosAdapter::new()),
        }
    }
}

impl FromStr for AdapterKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| EngineError::UnknownAdapter(s.to_string()))
    }
}

/// Builds the validator chain in the order the names are given.
pub fn resolve_validators<S: AsRef<str>>(names: &[S]) -> Result<ValidatorChain> {
    let validators = names
        .iter()
        .map(|name| name.as_ref().parse::<ValidatorKind>().map(ValidatorKind::build))
        .collect::<Result<Vec<_>>>()?;
    Ok(ValidatorChain::new(validators))
}

/// Builds the adapter chain in the order the names are given.
pub fn resolve_adapters<S: AsRef<str>>(names: &[S]) -> Result<AdapterChain> {
    let adapters = names
        .iter()
        .map(|name| name.as_ref().parse::<AdapterKind>().map(AdapterKind::build))
        .collect::<Result<Vec<_>>>()?;
    Ok(AdapterChain::new(adapters))
}
