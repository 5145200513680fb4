//! # cue-inject - fill CUE documents from the outside
//!
//! Fields of a CUE document declare where their value comes from. `cue-inject` finds those
//! declarations, asks the matching source for the value and writes it into the document.
//!
//! ```cue
//! @inject(tfstate,stateURL="./terraform/terraform.tfstate")
//!
//! name: string @inject(env,name=USER_NAME)
//! age:  int    @inject(tfstate,name=output.user.age)
//! ```
//!
//! With `USER_NAME=aereal` in the environment and a state file whose `user` output holds
//! `{age = 17}` the result is:
//!
//! ```cue
//! @inject(tfstate,stateURL="./terraform/terraform.tfstate")
//! name: "aereal" @inject(env,name=USER_NAME)
//! age: 17 @inject(tfstate,name=output.user.age)
//! ```
//!
//! ## Introduction for developers
//!
//! ### Terms
//!
//! - **directive**: the `@inject(<filler>,name=<key>)` attribute of a field, see [directive]
//! - **filler**: a named value source ([filler::Filler]); `env` reads environment variables,
//!   `tfstate` reads Terraform state
//! - **bootstrap directive**: a declaration attribute at the root of the document that configures a
//!   filler instead of naming a value, e.g. `@inject(tfstate,stateURL=...)`
//! - **pass**: one run of [Injector::inject] over one document
//!
//! ### A pass
//!
//! 1. The document is parsed and evaluated with [cuelite]. Failing to do so is the only error a
//!    pass can return.
//! 2. [walk::walk] visits every leaf of the evaluated tree, depth first in declaration order.
//!    Hidden (`_x`) and definition (`#X`) fields are visited too.
//! 3. For each leaf the [directive] is parsed and the filler it names resolves the key.
//! 4. The value is adjusted to the field ([coerce]) and unified into the tree with
//!    [cuelite::Value::fill_path].
//!
//! The walk iterates over the tree as it was before any fill. Each fill produces a new tree which
//! replaces the previous one.
//!
//! Every step of 3 and 4 may fail for a single field: a missing or malformed directive, an unknown
//! filler, a key without a value or a value the field does not accept. The field is then logged and
//! left unchanged; the pass carries on.
pub mod coerce;
pub mod directive;
pub mod filler;
mod injector;
pub mod walk;

pub use directive::{Directive, DirectiveError};
pub use filler::{Document, EnvFiller, FillError, Filler, TfStateFiller};
pub use injector::{InjectError, Injector, InjectorBuilder};
