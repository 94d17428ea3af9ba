// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 3MF (3D Manufacturing Format) exporter

use crate::assembly::Assembly;
use crate::geometry::Mesh;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{Cursor, Write as IoWrite};
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

const CORE_NAMESPACE: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";
const MODEL_PATH: &str = "3D/3dmodel.model";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// One `<object>` in the model
struct ModelObject<'a> {
    name: &'a str,
    mesh: &'a Mesh,
    /// Index into the base material group
    material: Option<usize>,
    /// Build item translation
    offset: [f64; 3],
}

/// Export a single mesh as a 3MF package
pub fn export_3mf(mesh: &Mesh, path: &Path) -> Result<()> {
    let objects = [ModelObject {
        name: "part",
        mesh,
        material: None,
        offset: [0.0; 3],
    }];
    write_package(path, &generate_model_xml(&objects, &[])?)
}

/// Export an assembly with one object per part. Part colours become base
/// materials and placements become build item transforms.
pub fn export_3mf_assembly(assembly: &Assembly, path: &Path) -> Result<()> {
    let materials: Vec<(String, String)> = assembly
        .parts
        .iter()
        .map(|part| (part.name.clone(), part.color.to_hex()))
        .collect();
    let objects: Vec<ModelObject> = assembly
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| ModelObject {
            name: &part.name,
            mesh: &part.mesh,
            material: Some(i),
            offset: [part.offset.x, part.offset.y, part.offset.z],
        })
        .collect();
    write_package(path, &generate_model_xml(&objects, &materials)?)
}

fn write_package(path: &Path, model_xml: &str) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create 3MF file {}", path.display()))?;
    let mut zip = ZipWriter::new(file);

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(CONTENT_TYPES_XML.as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(RELS_XML.as_bytes())?;

    zip.start_file(MODEL_PATH, options)?;
    zip.write_all(model_xml.as_bytes())?;

    zip.finish()?;
    Ok(())
}

fn generate_model_xml(objects: &[ModelObject], materials: &[(String, String)]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut model = BytesStart::new("model");
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xml:lang", "en-US"));
    model.push_attribute(("xmlns", CORE_NAMESPACE));
    writer.write_event(Event::Start(model))?;

    let mut title = BytesStart::new("metadata");
    title.push_attribute(("name", "Application"));
    writer.write_event(Event::Start(title))?;
    writer.write_event(Event::Text(BytesText::new(concat!(
        "casegen ",
        env!("CARGO_PKG_VERSION")
    ))))?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    writer.write_event(Event::Start(BytesStart::new("resources")))?;

    // Resource id 1 is the material group when present, objects follow
    let material_group_id = 1;
    let first_object_id = if materials.is_empty() { 1 } else { 2 };

    if !materials.is_empty() {
        let mut group = BytesStart::new("basematerials");
        group.push_attribute(("id", material_group_id.to_string().as_str()));
        writer.write_event(Event::Start(group))?;
        for (name, color) in materials {
            let mut base = BytesStart::new("base");
            base.push_attribute(("name", name.as_str()));
            base.push_attribute(("displaycolor", color.as_str()));
            writer.write_event(Event::Empty(base))?;
        }
        writer.write_event(Event::End(BytesEnd::new("basematerials")))?;
    }

    for (i, object) in objects.iter().enumerate() {
        write_object(&mut writer, first_object_id + i, material_group_id, object)?;
    }

    writer.write_event(Event::End(BytesEnd::new("resources")))?;

    writer.write_event(Event::Start(BytesStart::new("build")))?;
    for (i, object) in objects.iter().enumerate() {
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", (first_object_id + i).to_string().as_str()));
        if object.offset != [0.0; 3] {
            let [x, y, z] = object.offset;
            let transform = format!("1 0 0 0 1 0 0 0 1 {x} {y} {z}");
            item.push_attribute(("transform", transform.as_str()));
        }
        writer.write_event(Event::Empty(item))?;
    }
    writer.write_event(Event::End(BytesEnd::new("build")))?;

    writer.write_event(Event::End(BytesEnd::new("model")))?;

    let result = writer.into_inner().into_inner();
    Ok(String::from_utf8(result)?)
}

fn write_object(
    writer: &mut XmlWriter,
    id: usize,
    material_group_id: usize,
    object: &ModelObject,
) -> Result<()> {
    let mut element = BytesStart::new("object");
    element.push_attribute(("id", id.to_string().as_str()));
    element.push_attribute(("name", object.name));
    element.push_attribute(("type", "model"));
    if let Some(index) = object.material {
        element.push_attribute(("pid", material_group_id.to_string().as_str()));
        element.push_attribute(("pindex", index.to_string().as_str()));
    }
    writer.write_event(Event::Start(element))?;
    writer.write_event(Event::Start(BytesStart::new("mesh")))?;

    writer.write_event(Event::Start(BytesStart::new("vertices")))?;
    for vertex in &object.mesh.vertices {
        let mut v = BytesStart::new("vertex");
        v.push_attribute(("x", vertex.position.x.to_string().as_str()));
        v.push_attribute(("y", vertex.position.y.to_string().as_str()));
        v.push_attribute(("z", vertex.position.z.to_string().as_str()));
        writer.write_event(Event::Empty(v))?;
    }
    writer.write_event(Event::End(BytesEnd::new("vertices")))?;

    writer.write_event(Event::Start(BytesStart::new("triangles")))?;
    for triangle in &object.mesh.triangles {
        let mut t = BytesStart::new("triangle");
        t.push_attribute(("v1", triangle.indices[0].to_string().as_str()));
        t.push_attribute(("v2", triangle.indices[1].to_string().as_str()));
        t.push_attribute(("v3", triangle.indices[2].to_string().as_str()));
        writer.write_event(Event::Empty(t))?;
    }
    writer.write_event(Event::End(BytesEnd::new("triangles")))?;

    writer.write_event(Event::End(BytesEnd::new("mesh")))?;
    writer.write_event(Event::End(BytesEnd::new("object")))?;
    Ok(())
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>"#;

const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>"#;
