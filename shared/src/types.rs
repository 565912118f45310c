/// Edge-of-program result used by the binary and presentation layer.
pub type Result<T> = anyhow::Result<T>;
