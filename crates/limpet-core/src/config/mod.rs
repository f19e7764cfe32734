use serde_json::{Map, Value};

mod render;

pub use render::RenderConfig;

/// Raw scene settings as stored next to the node layout, read with dotted keys
/// (`"arrowhead.length"`) and turned into typed values by [`RenderConfig::from_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig(Value);

impl Default for SceneConfig {
    fn default() -> Self {
        Self::empty_object()
    }
}

impl SceneConfig {
    pub fn empty_object() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.0, |cur, segment| cur.as_object()?.get(segment))
    }

    /// Numbers, plus numeric strings (`"1.5"`), since hand-edited layouts carry both.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.lookup(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite())
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.lookup(key)?.as_u64()
    }

    /// Applies user overrides on top of the stored settings. Nested objects combine key by key;
    /// any other override value takes the place of what was stored.
    pub fn merge_overrides(&mut self, overrides: &Value) {
        overlay(&mut self.0, overrides);
    }
}

fn overlay(target: &mut Value, overrides: &Value) {
    if let (Value::Object(slots), Value::Object(values)) = (&mut *target, overrides) {
        for (key, value) in values {
            overlay(slots.entry(key.clone()).or_insert(Value::Null), value);
        }
        return;
    }
    *target = overrides.clone();
}
