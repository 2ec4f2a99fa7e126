#[derive(Debug, Clone)]
pub struct Specifier {
    pub request: String,
    #[allow(dead_code)]
    pub kind: SpecKind,
}

#[derive(Debug, Clone)]
pub enum SpecKind {
    Static,
    Dynamic,
}

/// Everything a single parse pass extracts from one file.
#[derive(Debug, Clone)]
pub struct ModuleSummary {
    pub specifiers: Vec<Specifier>,
    pub has_client_directive: bool,
}
