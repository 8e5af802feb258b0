pub mod binder;
pub mod guard;

pub use guard::SecuredRouter;
