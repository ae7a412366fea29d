//! One generation run: validate, allocate, synthesize and emit, per backing field.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use proc_macro2::{Ident, TokenStream};
use syn::Path;

use crate::diagnostic::Diagnostic;
use crate::emit::{Emitter, FieldLayout};
use crate::layout::allocate;
use crate::schema::{BackingFieldSchema, ContainerInfo};
use crate::synth::synthesize;
use crate::validate::{empty_container, validate, validate_container};

/// Accessors generated for one backing field.
#[derive(Clone, Debug)]
pub struct FieldOutput {
  pub field: Ident,
  pub tokens: TokenStream,
  pub layout: FieldLayout,
  /// Bit layout diagram as doc lines, for attaching to the backing field itself.
  pub layout_doc: Vec<String>,
}

/// Everything generated for one container.
#[derive(Clone, Debug, Default)]
pub struct ContainerOutput {
  pub tokens: TokenStream,
  pub fields: Vec<FieldOutput>,
  pub diagnostics: Vec<Diagnostic>,
}

/// Output of [`Session::generate_all`].
#[derive(Debug)]
pub struct Run {
  /// Present only for the first call on a session.
  pub support: Option<TokenStream>,
  pub fields: Vec<Result<FieldOutput, Vec<Diagnostic>>>,
}

/// Hands out the support declarations at most once.
///
/// Token types are bound to the thread that made them, so threads that
/// generate in parallel each build their own [`Session`] and share one of these.
#[derive(Debug, Default)]
pub struct SupportOnce {
  emitted: AtomicBool,
}

impl SupportOnce {
  pub fn new() -> Self {
    Self::default()
  }

  /// `true` for exactly one caller.
  pub fn claim(&self) -> bool {
    !self.emitted.swap(true, Ordering::AcqRel)
  }
}

/// A generation run. Fields are independent of each other; the support
/// declarations are handed out once per run.
pub struct Session {
  krate: Path,
  support: Arc<SupportOnce>,
}

impl Session {
  pub fn new(krate: Path) -> Self {
    Self::sharing(krate, Arc::new(SupportOnce::new()))
  }

  /// A session that is part of a larger run, sharing its support guard.
  pub fn sharing(krate: Path, support: Arc<SupportOnce>) -> Self {
    Self { krate, support }
  }

  pub fn krate(&self) -> &Path {
    &self.krate
  }

  /// The shared support declarations, the first time this is called.
  pub fn take_support(&self) -> Option<TokenStream> {
    if self.support.claim() { Some(Emitter::support()) } else { None }
  }

  /// Validate → allocate → synthesize → emit for a single backing field.
  pub fn generate(&self, schema: &BackingFieldSchema) -> Result<FieldOutput, Vec<Diagnostic>> {
    validate(schema)?;
    let allocated = allocate(&schema.declarations);
    let accessors = synthesize(schema, &allocated);
    let tokens = Emitter::new(&self.krate).backing_field(schema, &allocated, &accessors);
    Ok(FieldOutput {
      field: schema.field.clone(),
      tokens,
      layout: FieldLayout::new(schema, &allocated),
      layout_doc: crate::emit::layout_doc(schema, &allocated),
    })
  }

  /// Generate every field of one container, plus its `BitDivisible` metadata.
  ///
  /// A failing field contributes diagnostics and nothing else; the others are
  /// still generated. A container without backing fields is checked on its own
  /// and warned about.
  pub fn generate_container(&self, container: &ContainerInfo, schemas: &[BackingFieldSchema]) -> ContainerOutput {
    let mut out = ContainerOutput::default();
    if schemas.is_empty() {
      out.diagnostics = validate_container(container);
      out.diagnostics.push(empty_container(container));
      return out;
    }

    for schema in schemas {
      match self.generate(schema) {
        Ok(field) => {
          out.tokens.extend(field.tokens.clone());
          out.fields.push(field);
        }
        Err(diags) => out.diagnostics.extend(diags),
      }
    }
    dedup_container_diagnostics(&mut out.diagnostics);

    if !out.fields.is_empty() {
      let layouts: Vec<FieldLayout> = out.fields.iter().map(|f| f.layout.clone()).collect();
      out.tokens.extend(Emitter::new(&self.krate).metadata(container, &layouts));
    }
    out
  }

  /// Support declarations (first call only) and every field's outcome, in input order.
  pub fn generate_all(&self, schemas: &[BackingFieldSchema]) -> Run {
    Run { support: self.take_support(), fields: schemas.iter().map(|s| self.generate(s)).collect() }
  }
}

// Container-level checks run once per field; report each only once.
fn dedup_container_diagnostics(diags: &mut Vec<Diagnostic>) {
  let mut seen = Vec::new();
  diags.retain(|d| {
    let key = (d.code, d.message.clone());
    if seen.contains(&key) {
      false
    } else {
      seen.push(key);
      true
    }
  });
}
