//! On-disk conventions for plugin metadata inside a WebAssembly module.
//!
//! The manifest is a custom section named `<namespace>.manifest.json`.
//! Types and their attributes live in the `hotload.types` custom section:
//!
//! ```text
//! type-table := vec(type-def)
//! type-def   := full-name:string  attributes:vec(attribute)
//! attribute  := attr-type:string  args:vec(argument)
//! argument   := arg-type:string   value:s32
//! ```
//!
//! `vec` and `string` use the core WebAssembly encodings (a LEB128 `u32`
//! count or byte length). `s32` is a signed LEB128 integer.

use hotload_core::types::RuntimeOptions;
use wasmparser::BinaryReader;

use super::{AttributeArgument, CustomAttribute, TypeDefinition};
use crate::error::IngestError;

/// Suffix identifying the manifest resource.
pub const MANIFEST_SUFFIX: &str = ".manifest.json";

/// Custom section holding the type table.
pub const TYPE_TABLE_SECTION: &str = "hotload.types";

/// Attribute type marking a plugin entry type.
pub const PLUGIN_ATTRIBUTE: &str = "Hotload.PluginAttribute";

/// WebAssembly module header: magic and version 1.
pub const MODULE_HEADER: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00];

const CUSTOM_SECTION_ID: u8 = 0;

/// Decodes a type table section payload.
///
/// `offset` is the payload's position in the module, used in error messages.
pub fn decode_type_table(data: &[u8], offset: usize) -> Result<Vec<TypeDefinition>, IngestError> {
    let mut reader = BinaryReader::new(data, offset);
    let count = reader.read_var_u32()?;
    let mut types = Vec::new();

    for _ in 0..count {
        let full_name = reader.read_string()?.to_string();
        let attribute_count = reader.read_var_u32()?;
        let mut attributes = Vec::new();

        for _ in 0..attribute_count {
            let attribute_type = reader.read_string()?.to_string();
            let argument_count = reader.read_var_u32()?;
            let mut arguments = Vec::new();

            for _ in 0..argument_count {
                let arg_type = reader.read_string()?.to_string();
                let value = reader.read_var_i32()?;
                arguments.push(AttributeArgument { arg_type, value });
            }
            attributes.push(CustomAttribute {
                attribute_type,
                arguments,
            });
        }
        types.push(TypeDefinition {
            full_name,
            attributes,
        });
    }

    if !reader.eof() {
        return Err(IngestError::MalformedModule(format!(
            "trailing bytes in '{TYPE_TABLE_SECTION}' section at offset {}",
            reader.original_position()
        )));
    }
    Ok(types)
}

/// Encodes a type table section payload.
pub fn encode_type_table(types: &[TypeDefinition]) -> Vec<u8> {
    let mut out = Vec::new();
    write_len(&mut out, types.len());
    for ty in types {
        write_string(&mut out, &ty.full_name);
        write_len(&mut out, ty.attributes.len());
        for attribute in &ty.attributes {
            write_string(&mut out, &attribute.attribute_type);
            write_len(&mut out, attribute.arguments.len());
            for argument in &attribute.arguments {
                write_string(&mut out, &argument.arg_type);
                write_var_i32(&mut out, argument.value);
            }
        }
    }
    out
}

/// The plugin entry marker carrying `options`.
pub fn plugin_attribute(options: RuntimeOptions) -> CustomAttribute {
    CustomAttribute {
        attribute_type: PLUGIN_ATTRIBUTE.to_string(),
        arguments: vec![AttributeArgument {
            arg_type: RuntimeOptions::TYPE_NAME.to_string(),
            value: options.as_i32(),
        }],
    }
}

/// Appends a custom section to an encoded module.
///
/// Custom sections may appear anywhere after the header, so appending never
/// disturbs the sections already present.
pub fn append_custom_section(module: &mut Vec<u8>, name: &str, data: &[u8]) {
    let mut payload = Vec::with_capacity(name.len() + data.len() + 5);
    write_string(&mut payload, name);
    payload.extend_from_slice(data);

    module.push(CUSTOM_SECTION_ID);
    write_len(module, payload.len());
    module.extend_from_slice(&payload);
}

/// Appends the manifest resource and type table to an encoded module.
pub fn embed_plugin_metadata(
    module: &mut Vec<u8>,
    namespace: &str,
    manifest_json: &[u8],
    types: &[TypeDefinition],
) {
    append_custom_section(module, &format!("{namespace}{MANIFEST_SUFFIX}"), manifest_json);
    append_custom_section(module, TYPE_TABLE_SECTION, &encode_type_table(types));
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    write_var_u32(out, u32::try_from(len).unwrap_or(u32::MAX));
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    write_len(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn write_var_u32(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

fn write_var_i32(out: &mut Vec<u8>, mut value: i32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
        if done {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}
