/// A derived value cached against the inputs it was computed from.
///
/// The value is recomputed only when the key differs from the one it was
/// last computed with.
#[derive(Debug, Clone)]
pub struct Memoized<K, V> {
    entry: Option<(K, V)>,
    computations: u64,
}

impl<K, V> Default for Memoized<K, V> {
    fn default() -> Self {
        Self {
            entry: None,
            computations: 0,
        }
    }
}

impl<K: PartialEq, V> Memoized<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce(&K) -> V) -> &V {
        let entry = match self.entry.take() {
            Some((cached, value)) if cached == key => self.entry.insert((cached, value)),
            _ => {
                self.computations += 1;
                let value = compute(&key);
                self.entry.insert((key, value))
            }
        };
        &entry.1
    }

    /// Cached value, if it was computed for exactly this key.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entry
            .as_ref()
            .filter(|(cached, _)| cached == key)
            .map(|(_, value)| value)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many times the value has been computed.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
