// Routing segregation: unauthenticated gateway endpoints vs everything that
// requires a bearer token. Authorization ranks are enforced inside the
// handlers; the split here only decides whether the AuthUser extractor runs.
pub mod authenticated;
pub mod public;
