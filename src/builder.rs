//! The process builder: validation and materialization of one process-model
//! instance.
//!
//! A [`ProcessBuilder`] is populated with the compiler's Var and Port
//! initializers and the transport layer's channel endpoints, validated with
//! [`check_all_vars_and_ports_set`] and [`check_type_compatibility`], and
//! then spent by [`build`], which produces exactly one live model instance.
//!
//! The checks are the caller's responsibility: deployment code runs both
//! before `build`, and `build` itself does not repeat them.
//!
//! [`check_all_vars_and_ports_set`]: ProcessBuilder::check_all_vars_and_ports_set
//! [`check_type_compatibility`]: ProcessBuilder::check_type_compatibility
//! [`build`]: ProcessBuilder::build

use std::marker::PhantomData;
use std::sync::Arc;

use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::instrument;

use crate::channels::ChannelEndpoint;
use crate::process::{ModelParts, Port, PortInitializer, ProcessModel, Var, VarInitializer};
use crate::schema::{ModelSchema, TypeTag};
use crate::tensor::ShapeError;
use crate::types::PortDirection;

/// Static configuration mismatches detected before or during build.
///
/// None of these are transient: each one means the declared contract and the
/// supplied descriptors disagree, so they are surfaced immediately and never
/// retried.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("no attribute `{attr}` declared on model `{model}`")]
    #[diagnostic(code(procmesh::builder::unknown_attribute))]
    UnknownAttribute { model: &'static str, attr: String },

    #[error("attributes of model `{model}` missing initializers: {missing:?}")]
    #[diagnostic(
        code(procmesh::builder::incomplete_binding),
        help("every declared attribute needs exactly one initializer before build")
    )]
    IncompleteBinding {
        model: &'static str,
        missing: Vec<String>,
    },

    #[error("primary tag of port `{attr}` is {tag}, which is not a type")]
    #[diagnostic(code(procmesh::builder::invalid_type_descriptor))]
    InvalidTypeDescriptor { attr: String, tag: TypeTag },

    #[error("port `{attr}` expects an {expected} type, got {tag}")]
    #[diagnostic(code(procmesh::builder::type_mismatch))]
    TypeMismatch {
        attr: String,
        expected: PortDirection,
        tag: TypeTag,
    },

    #[error("model assembly requested `{attr}`, which the builder did not produce")]
    #[diagnostic(code(procmesh::builder::missing_part))]
    MissingPart { attr: String },

    #[error(transparent)]
    #[diagnostic(code(procmesh::builder::shape))]
    Shape(#[from] ShapeError),
}

/// Validates type descriptors against supplied initializers and endpoints,
/// then materializes one live instance of `M`.
///
/// Initializers and endpoints are stored by name; insertion order is
/// irrelevant and the last write for a name wins. Endpoints may cover only a
/// subset of the declared ports; unbound ports are built dangling.
pub struct ProcessBuilder<M: ProcessModel> {
    schema: &'static ModelSchema,
    model_id: u32,
    vars: FxHashMap<String, VarInitializer>,
    ports: FxHashMap<String, PortInitializer>,
    endpoints: FxHashMap<String, Arc<dyn ChannelEndpoint>>,
    _model: PhantomData<fn() -> M>,
}

impl<M: ProcessModel> ProcessBuilder<M> {
    pub fn new(model_id: u32) -> Self {
        ProcessBuilder {
            schema: M::schema(),
            model_id,
            vars: FxHashMap::default(),
            ports: FxHashMap::default(),
            endpoints: FxHashMap::default(),
            _model: PhantomData,
        }
    }

    pub fn model_id(&self) -> u32 {
        self.model_id
    }

    pub fn schema(&self) -> &'static ModelSchema {
        self.schema
    }

    pub fn var_initializer(&self, name: &str) -> Option<&VarInitializer> {
        self.vars.get(name)
    }

    pub fn port_initializer(&self, name: &str) -> Option<&PortInitializer> {
        self.ports.get(name)
    }

    pub fn endpoint(&self, name: &str) -> Option<&Arc<dyn ChannelEndpoint>> {
        self.endpoints.get(name)
    }

    /// Store Var initializers. Every name must be declared on the model's
    /// schema; an unknown name is rejected immediately.
    pub fn set_variables(&mut self, initializers: Vec<VarInitializer>) -> Result<(), BuildError> {
        for init in initializers {
            if !self.schema.contains(&init.name) {
                return Err(BuildError::UnknownAttribute {
                    model: self.schema.model(),
                    attr: init.name,
                });
            }
            self.vars.insert(init.name.clone(), init);
        }
        Ok(())
    }

    /// Store Port initializers, under the same unknown-name contract as
    /// [`set_variables`](Self::set_variables).
    pub fn set_ports(&mut self, initializers: Vec<PortInitializer>) -> Result<(), BuildError> {
        for init in initializers {
            if !self.schema.contains(&init.name) {
                return Err(BuildError::UnknownAttribute {
                    model: self.schema.model(),
                    attr: init.name,
                });
            }
            self.ports.insert(init.name.clone(), init);
        }
        Ok(())
    }

    /// Store channel endpoints by name. No schema check: endpoints may
    /// legitimately cover only a subset of the ports, leaving the rest
    /// dangling.
    pub fn set_channel_endpoints(&mut self, endpoints: Vec<Arc<dyn ChannelEndpoint>>) {
        for endpoint in endpoints {
            self.endpoints
                .insert(endpoint.name().to_string(), endpoint);
        }
    }

    /// Verify every declared attribute has an initializer. Passes exactly
    /// when the stored initializer name-set equals the schema name-set.
    #[instrument(skip(self), fields(model = self.schema.model()), err)]
    pub fn check_all_vars_and_ports_set(&self) -> Result<(), BuildError> {
        let mut missing: Vec<String> = self
            .schema
            .names()
            .filter(|name| !self.vars.contains_key(*name) && !self.ports.contains_key(*name))
            .map(str::to_string)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            missing.sort();
            Err(BuildError::IncompleteBinding {
                model: self.schema.model(),
                missing,
            })
        }
    }

    /// Verify every stored port initializer against its descriptor: the
    /// primary tag must be an actual type, and its direction capability must
    /// match the initializer's declared direction. A tag equal to the
    /// direction base is accepted alongside the concrete implementations.
    #[instrument(skip(self), fields(model = self.schema.model()), err)]
    pub fn check_type_compatibility(&self) -> Result<(), BuildError> {
        for (name, init) in &self.ports {
            let descriptor = self.schema.descriptor(name).ok_or_else(|| {
                BuildError::UnknownAttribute {
                    model: self.schema.model(),
                    attr: name.clone(),
                }
            })?;
            if !descriptor.tag.is_type() {
                return Err(BuildError::InvalidTypeDescriptor {
                    attr: name.clone(),
                    tag: descriptor.tag,
                });
            }
            if descriptor.tag.direction() != Some(init.direction) {
                return Err(BuildError::TypeMismatch {
                    attr: name.clone(),
                    expected: init.direction,
                    tag: descriptor.tag,
                });
            }
        }
        Ok(())
    }

    /// Materialize the model instance: every Var gets its init value
    /// broadcast to the declared shape and the descriptor's default
    /// precision; every Port gets its declared geometry and the matching
    /// stored endpoint, or stays dangling when none was supplied.
    ///
    /// Assumes [`check_all_vars_and_ports_set`](Self::check_all_vars_and_ports_set)
    /// and [`check_type_compatibility`](Self::check_type_compatibility)
    /// already passed.
    #[instrument(skip(self), fields(model = self.schema.model(), model_id = self.model_id), err)]
    pub fn build(self) -> Result<M, BuildError> {
        let mut parts = ModelParts::default();

        for (name, init) in &self.vars {
            let descriptor =
                self.schema
                    .descriptor(name)
                    .ok_or_else(|| BuildError::UnknownAttribute {
                        model: self.schema.model(),
                        attr: name.clone(),
                    })?;
            let value = init.init.materialize(&init.shape)?;
            parts.insert_var(Var {
                name: name.clone(),
                shape: init.shape.clone(),
                value,
                id: init.id,
                precision: descriptor.precision,
            });
        }

        for (name, init) in &self.ports {
            let descriptor =
                self.schema
                    .descriptor(name)
                    .ok_or_else(|| BuildError::UnknownAttribute {
                        model: self.schema.model(),
                        attr: name.clone(),
                    })?;
            let mut port = match init.direction {
                PortDirection::Input => {
                    Port::input(name.as_str(), init.shape.clone(), descriptor.dtype)
                }
                PortDirection::Output => {
                    Port::output(name.as_str(), init.shape.clone(), descriptor.dtype)
                }
            };
            if let Some(endpoint) = self.endpoints.get(name) {
                port.bind(Arc::clone(endpoint));
            }
            parts.insert_port(port);
        }

        tracing::debug!(
            model = self.schema.model(),
            model_id = self.model_id,
            vars = self.vars.len(),
            ports = self.ports.len(),
            bound_endpoints = self.endpoints.len(),
            "assembling process model"
        );
        M::assemble(parts)
    }
}
