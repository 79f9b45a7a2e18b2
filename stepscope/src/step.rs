//! Instrumenting functions with named steps.
//!
//! [`wrap`] pairs a function with a step-name template and its declared
//! parameters. Each call resolves the template against the call's arguments
//! and runs the function inside a [`StepScope`] with the resulting label.
//!
//! ```
//! use serde_json::json;
//! use stepscope::core::args::{CallArgs, Param, Signature};
//! use stepscope::session::Session;
//! use stepscope::step::wrap;
//!
//! let fetch = wrap(
//!     "Fetch {url}",
//!     Signature::new(vec![Param::required("url"), Param::optional("retries", 3)]),
//!     |args: &CallArgs| Ok(args.positional.len()),
//! )
//! .unwrap();
//!
//! let session = Session::local();
//! let count = fetch.call(&session, CallArgs::new().arg("http://x")).unwrap();
//! assert_eq!(count, 1);
//! assert_eq!(
//!     fetch.step().label(&CallArgs::new().arg(json!("http://x"))).unwrap(),
//!     "Fetch http://x"
//! );
//! ```

use anyhow::Result;

use crate::core::args::{CallArgs, Signature};
use crate::core::resolve::{ResolveError, resolve_name};
use crate::core::types::Status;
use crate::scope::StepScope;
use crate::session::Session;

/// A step-name template bound to a declared parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    template: String,
    signature: Signature,
    exit_status: Status,
}

impl Step {
    /// Declare a step. Signatures that can never bind are rejected here.
    pub fn new(template: impl Into<String>, signature: Signature) -> Result<Self, ResolveError> {
        signature.validate()?;
        Ok(Self {
            template: template.into(),
            signature,
            exit_status: Status::default(),
        })
    }

    /// Status reported when the step body succeeds.
    pub fn with_status(mut self, status: Status) -> Self {
        self.exit_status = status;
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn exit_status(&self) -> Status {
        self.exit_status
    }

    /// Resolve the step label for one call.
    pub fn label(&self, args: &CallArgs) -> Result<String, ResolveError> {
        resolve_name(&self.template, &self.signature, args)
    }

    /// Run `body` as this step.
    ///
    /// Label resolution errors are returned before `body` runs; they can be
    /// recovered with `downcast_ref::<ResolveError>()`.
    pub fn call<T>(
        &self,
        session: &Session,
        args: &CallArgs,
        body: impl FnOnce(&CallArgs) -> Result<T>,
    ) -> Result<T> {
        let label = self.label(args)?;
        StepScope::run(session, label, self.exit_status, || body(args))
    }

    /// Bind this step to `f`.
    pub fn wrap<F, T>(self, f: F) -> StepFn<F>
    where
        F: Fn(&CallArgs) -> Result<T>,
    {
        StepFn { step: self, f }
    }
}

/// A function instrumented with a [`Step`].
pub struct StepFn<F> {
    step: Step,
    f: F,
}

impl<F> StepFn<F> {
    pub fn step(&self) -> &Step {
        &self.step
    }

    /// Call the wrapped function inside its step and return its result.
    pub fn call<T>(&self, session: &Session, args: CallArgs) -> Result<T>
    where
        F: Fn(&CallArgs) -> Result<T>,
    {
        self.step.call(session, &args, &self.f)
    }
}

/// Instrument `f` with a step named by `template`.
pub fn wrap<F, T>(
    template: impl Into<String>,
    signature: Signature,
    f: F,
) -> Result<StepFn<F>, ResolveError>
where
    F: Fn(&CallArgs) -> Result<T>,
{
    Ok(Step::new(template, signature)?.wrap(f))
}
