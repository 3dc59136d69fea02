use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use log::debug;

use crate::check_label::CheckLabelLayer;
use crate::error::{LayerError, Result};
use crate::layer::Layer;
use crate::params::LayerParams;

/// Constructor function for a layer type.
pub type LayerConstructor = fn() -> Box<dyn Layer>;

/// Registry mapping layer type names to constructor functions.
///
/// The host framework resolves the type names appearing in its graph
/// description against this registry while wiring the graph. All
/// registration happens during process-wide initialization, before the
/// first graph is constructed; there is no unregistration.
pub struct LayerRegistry {
    constructors: RwLock<HashMap<String, LayerConstructor>>,
}

impl LayerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(HashMap::new()),
        }
    }

    /// Register a layer type under `name`.
    ///
    /// Registering the same name twice is an error.
    pub fn register(&self, name: &str, constructor: LayerConstructor) -> Result<()> {
        let mut constructors = self.constructors.write().unwrap();
        if constructors.contains_key(name) {
            return Err(LayerError::DuplicateLayer(name.to_string()));
        }
        debug!("registering layer type '{}'", name);
        constructors.insert(name.to_string(), constructor);
        Ok(())
    }

    /// Returns true if `name` is a registered layer type.
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.read().unwrap().contains_key(name)
    }

    /// List all registered layer type names.
    pub fn layer_types(&self) -> Vec<String> {
        self.constructors.read().unwrap().keys().cloned().collect()
    }

    /// Construct a layer by type name and run its setup against `params`.
    pub fn create(&self, name: &str, params: &LayerParams) -> Result<Box<dyn Layer>> {
        let constructor = {
            let constructors = self.constructors.read().unwrap();
            constructors
                .get(name)
                .copied()
                .ok_or_else(|| LayerError::UnknownLayer(name.to_string()))?
        };
        let mut layer = constructor();
        layer.setup(params)?;
        Ok(layer)
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the layer types shipped with this crate.
pub fn register_builtin_layers(registry: &LayerRegistry) -> Result<()> {
    registry.register("CheckLabel", || Box::new(CheckLabelLayer::new()))?;
    Ok(())
}

/// Global layer registry instance.
static GLOBAL_LAYER_REGISTRY: OnceLock<LayerRegistry> = OnceLock::new();

/// Get the process-wide layer registry, with builtin layers registered.
pub fn global_registry() -> &'static LayerRegistry {
    GLOBAL_LAYER_REGISTRY.get_or_init(|| {
        let registry = LayerRegistry::new();
        register_builtin_layers(&registry)
            .expect("builtin layer registration cannot conflict on a fresh registry");
        registry
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_create() {
        let registry = LayerRegistry::new();
        register_builtin_layers(&registry).unwrap();
        assert!(registry.contains("CheckLabel"));

        let params = LayerParams::new().with("top_k", 2i64);
        let layer = registry.create("CheckLabel", &params).unwrap();
        assert_eq!(layer.type_name(), "CheckLabel");
        assert_eq!(layer.min_inputs(), 2);
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = LayerRegistry::new();
        register_builtin_layers(&registry).unwrap();
        assert!(matches!(
            register_builtin_layers(&registry),
            Err(LayerError::DuplicateLayer(_))
        ));
    }

    #[test]
    fn test_unknown_layer() {
        let registry = LayerRegistry::new();
        let params = LayerParams::new();
        assert!(matches!(
            registry.create("NoSuchLayer", &params),
            Err(LayerError::UnknownLayer(_))
        ));
    }

    #[test]
    fn test_invalid_params_surface_from_create() {
        let registry = LayerRegistry::new();
        register_builtin_layers(&registry).unwrap();
        let params = LayerParams::new().with("top_k", 0i64);
        assert!(registry.create("CheckLabel", &params).is_err());
    }

    #[test]
    fn test_global_registry() {
        let registry = global_registry();
        assert!(registry.contains("CheckLabel"));
        assert_eq!(registry.layer_types(), vec!["CheckLabel".to_string()]);
    }
}
