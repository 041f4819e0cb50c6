use std::fmt::Write;

use tracing::{debug, warn};

use super::{
    DEFAULT_FUNCTION_NAME, GenerateError, GenerateOptions, GeneratedUnit, Generator, MISSING_STRUCT, Output,
    detect_imports,
};
use crate::ast::{FieldDescriptor, StructDescriptor, is_identifier};
use crate::graph::{FieldMapping, MappingSpec};
use crate::transformer::TransformerDescriptor;

/// Emits Go conversion functions
#[derive(Debug, Default, Clone, Copy)]
pub struct GoGenerator;

impl GoGenerator {
    pub fn new() -> Self {
        Self
    }

    fn emit_function(
        &self,
        function_name: &str,
        source: &StructDescriptor,
        target: &StructDescriptor,
        mappings: &[FieldMapping],
        options: &GenerateOptions,
    ) -> Result<String, GenerateError> {
        for descriptor in [source, target] {
            if descriptor.name.is_empty() {
                return Err(GenerateError::UnnamedStruct(descriptor.id.clone()));
            }
        }

        let src = &options.source_var;
        let dst = &options.target_var;
        let mut output = Output::new(&options.indent);

        writeln!(output, "func {}({} {}) {} {{", function_name, src, source.name, target.name)?;
        output.indent(1);
        writeln!(output, "var {} {}", dst, target.name)?;
        output.blank();

        if !mappings.is_empty() {
            output.line(1, "// Field mappings");
            for mapping in mappings {
                self.emit_assignment(&mut output, mapping, source, target, options)?;
            }
            output.blank();
        } else {
            // Auto-match only when nothing was mapped explicitly
            let common: Vec<&str> = target
                .fields
                .iter()
                .map(|f| f.name.as_str())
                .filter(|name| !name.is_empty() && source.has_field(name))
                .collect();

            if !common.is_empty() {
                output.line(1, "// Auto-mapped fields with matching names");
                for name in common {
                    output.indent(1);
                    writeln!(output, "{}.{} = {}.{}", dst, name, src, name)?;
                }
                output.blank();
            }
        }

        output.indent(1);
        writeln!(output, "return {}", dst)?;
        output.line(0, "}");

        Ok(output.finish())
    }

    fn emit_assignment(
        &self,
        output: &mut Output,
        mapping: &FieldMapping,
        source: &StructDescriptor,
        target: &StructDescriptor,
        options: &GenerateOptions,
    ) -> Result<(), GenerateError> {
        let value = format!("{}.{}", options.source_var, mapping.source_field);

        let expression = match (&mapping.transformer, source.field(&mapping.source_field), target.field(&mapping.target_field)) {
            (Some(transformer), _, _) => format!("{}({})", transformer.call_name(), value),
            (None, Some(from), Some(to)) if from.is_nested_struct() && to.is_nested_struct() => {
                // Assumed to exist; nested mappings are not generated
                format!("{}({})", nested_function_name(from, to), value)
            }
            _ => value,
        };

        output.indent(1);
        writeln!(output, "{}.{} = {}", options.target_var, mapping.target_field, expression)?;
        Ok(())
    }
}

/// `Map<A>To<B>` for two nested struct fields; inline types are opaque, so field names stand in
fn nested_function_name(from: &FieldDescriptor, to: &FieldDescriptor) -> String {
    let part = |field: &FieldDescriptor| -> String {
        if is_identifier(&field.ty) { field.ty.clone() } else { field.name.clone() }
    };
    format!("Map{}To{}", part(from), part(to))
}

impl Generator for GoGenerator {
    fn generate(
        &self,
        spec: &MappingSpec,
        transformers: &[TransformerDescriptor],
        options: &GenerateOptions,
    ) -> GeneratedUnit {
        let (Some(source), Some(target)) = (&spec.source_struct, &spec.target_struct) else {
            let name = options.function_name.clone().unwrap_or_else(|| DEFAULT_FUNCTION_NAME.to_string());
            return GeneratedUnit::failed(name, MISSING_STRUCT);
        };

        let function_name = options
            .function_name
            .clone()
            .unwrap_or_else(|| format!("Map{}To{}", source.name, target.name));

        match self.emit_function(&function_name, source, target, &spec.field_mappings, options) {
            Ok(body_text) => {
                let imports = detect_imports(transformers);
                debug!(
                    function = %function_name,
                    mappings = spec.field_mappings.len(),
                    imports = imports.len(),
                    "generated mapping function"
                );
                GeneratedUnit {
                    function_name,
                    body_text,
                    imports,
                    errors: Vec::new(),
                }
            }
            Err(err) => {
                warn!(%err, "code generation failed");
                GeneratedUnit::failed(function_name, format!("Code generation error: {}", err))
            }
        }
    }
}

/// Wrap a unit into a complete Go source file
pub fn format_unit(unit: &GeneratedUnit, package_name: &str) -> String {
    let mut code = format!("package {}\n\n", package_name);

    match unit.imports.as_slice() {
        [] => {}
        [single] => code.push_str(&format!("import \"{}\"\n\n", single)),
        packages => {
            code.push_str("import (\n");
            for package in packages {
                code.push_str(&format!("    \"{}\"\n", package));
            }
            code.push_str(")\n\n");
        }
    }

    code.push_str(&unit.body_text);
    if !code.ends_with('\n') {
        code.push('\n');
    }
    code
}
