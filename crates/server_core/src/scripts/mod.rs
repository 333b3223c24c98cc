//! Bundled content scripts.

mod barrier;
mod blink;
mod bolt;
mod drain;

pub use barrier::Barrier;
pub use blink::Blink;
pub use bolt::Bolt;
pub use drain::Drain;

use crate::script::ScriptRegistry;

pub fn register_builtins(r: &mut ScriptRegistry) {
    r.register("Bolt", || Box::new(Bolt));
    r.register("Barrier", || Box::new(Barrier));
    r.register("Blink", || Box::new(Blink));
    r.register("Drain", || Box::new(Drain::default()));
}
