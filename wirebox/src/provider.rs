use crate::container::Container;
use crate::error::Error;
use crate::runtime::Instance;
use crate::scope::Scope;

/// Anything that can hand out services by name.
///
/// Implemented by [`Container`] and [`Scope`] so code that only consumes
/// services, including the helpers in [`typed`](crate::typed), does not care
/// which of the two it was given.
pub trait ServiceProvider {
    fn try_get_service(&self, name: &str) -> Result<Instance, Error>;

    /// Like [`try_get_service`](Self::try_get_service), panicking on failure.
    fn get_service(&self, name: &str) -> Instance {
        self.try_get_service(name)
            .unwrap_or_else(|err| panic!("{}", err))
    }
}

impl ServiceProvider for Container {
    fn try_get_service(&self, name: &str) -> Result<Instance, Error> {
        Container::try_get_service(self, name)
    }
}

impl ServiceProvider for Scope {
    fn try_get_service(&self, name: &str) -> Result<Instance, Error> {
        Scope::try_get_service(self, name)
    }
}
