use std::collections::HashMap;

use crate::diagnostic::{Code, Diagnostic};
use crate::layout::allocate;
use crate::schema::{AccessibilityDecl, BackingFieldSchema, ContainerInfo, ValueKind, unraw};

/// Checks that only depend on the container.
pub fn validate_container(container: &ContainerInfo) -> Vec<Diagnostic> {
  let mut out = Vec::new();
  if let AccessibilityDecl::Unrecognized(text) = &container.accessibility {
    out.push(Diagnostic::new(
      Code::InvalidAccessibility,
      container.span(),
      format!(
        "`{}` is declared `{text}`; only private, `pub(super)`, `pub(crate)` or `pub` containers are supported",
        container.name
      ),
    ));
  }
  if !container.extensible {
    out.push(Diagnostic::new(
      Code::ContainerNotExtensible,
      container.span(),
      format!("`{}` cannot receive generated members; #[bit_divisible] requires a struct with named fields", container.name),
    ));
  }
  out
}

/// Warning for a container that carries the attribute but no backing fields.
pub fn empty_container(container: &ContainerInfo) -> Diagnostic {
  Diagnostic::new(
    Code::EmptySchema,
    container.span(),
    format!("#[bit_divisible] is not needed on `{}`: no field declares #[bit_field] sub-fields", container.name),
  )
}

/// Run every structural check on one backing field and collect what fails.
///
/// Any diagnostic, the empty-schema warning included, means no accessors are
/// generated for this field.
pub fn validate(schema: &BackingFieldSchema) -> Result<(), Vec<Diagnostic>> {
  let mut out = validate_container(&schema.container);

  if schema.shared && schema.backing.atomic().is_none() {
    out.push(Diagnostic::new(
      Code::UnsupportedSharedBacking,
      schema.span,
      format!("shared backing field `{}` cannot be `{}`: there is no stable atomic of that width", schema.field, schema.backing.name()),
    ));
  }

  if schema.is_empty() {
    out.push(Diagnostic::new(
      Code::EmptySchema,
      schema.span,
      format!("`{}` declares no sub-fields; no accessors are generated for it", schema.field),
    ));
    return Err(out);
  }

  check_capacity(schema, &mut out);
  check_value_widths(schema, &mut out);
  check_names(schema, &mut out);

  if out.is_empty() { Ok(()) } else { Err(out) }
}

fn check_capacity(schema: &BackingFieldSchema, out: &mut Vec<Diagnostic>) {
  let capacity = schema.backing.bits();
  if let Some(first) = allocate(&schema.declarations).into_iter().find(|a| a.end() > capacity) {
    let total = crate::layout::total_width(&schema.declarations);
    out.push(Diagnostic::new(
      Code::CapacityExceeded,
      first.decl.span,
      format!(
        "`{}` needs {total} bits but `{}` holds {capacity}; `{}` would start at bit {}",
        schema.field,
        schema.backing.name(),
        first.decl.name,
        first.bit_offset
      ),
    ));
  }
}

fn check_value_widths(schema: &BackingFieldSchema, out: &mut Vec<Diagnostic>) {
  for decl in &schema.declarations {
    if let ValueKind::Int(ty) = decl.kind {
      if decl.width == 0 {
        out.push(Diagnostic::new(Code::InvalidWidth, decl.span, format!("`{}` is 0 bits wide", decl.name)));
      } else if decl.width > ty.bits() {
        out.push(Diagnostic::new(
          Code::InvalidWidth,
          decl.span,
          format!("`{}` is {} bits wide but `{}` holds {}", decl.name, decl.width, ty.name(), ty.bits()),
        ));
      }
    }
  }
}

fn check_names(schema: &BackingFieldSchema, out: &mut Vec<Diagnostic>) {
  let mutator = schema.mutator_name().to_string();
  let mut getters: HashMap<String, &proc_macro2::Ident> = HashMap::new();
  let mut params: HashMap<String, &proc_macro2::Ident> = HashMap::new();

  for decl in &schema.declarations {
    let name = unraw(&decl.name);
    if let Some(prev) = getters.insert(name.clone(), &decl.name) {
      out.push(Diagnostic::new(
        Code::DuplicateName,
        decl.span,
        format!("sub-field `{}` is declared twice on `{}` (first as `{prev}`)", decl.name, schema.field),
      ));
      continue;
    }
    let param = unraw(&decl.param_name());
    if let Some(prev) = params.insert(param.clone(), &decl.name) {
      out.push(Diagnostic::new(
        Code::DuplicateName,
        decl.span,
        format!("sub-fields `{prev}` and `{}` both map to the mutator parameter `{param}`", decl.name),
      ));
    }
    if name == mutator {
      out.push(Diagnostic::new(
        Code::DuplicateName,
        decl.span,
        format!("sub-field `{}` collides with the generated mutator `{mutator}`", decl.name),
      ));
    }
    if schema.shared && name == unraw(&schema.field) {
      out.push(Diagnostic::new(
        Code::DuplicateName,
        decl.span,
        format!("sub-field `{}` collides with the shared accessor `{}()`", decl.name, schema.field),
      ));
    }
  }
}
