#![allow(dead_code)]

use pipeforge_convert::{Data, DataTypeInfo, FnConverter, upcast_through};
use pipeforge_host::{
    Extension, ExtensionHost, ExtensionMetadata, NodeTypeInfo, ParameterTypeInfo,
};
use pipeforge_types::{EntityId, SourceId};
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
}

impl Data for Image {}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub image: Image,
}

impl Data for Mask {
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        upcast_through(self, target, &self.image)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub rows: usize,
}

impl Data for CsvTable {}

pub struct ThresholdNode;
pub struct ExportNode;
pub struct MeasureNode;
pub struct ColorMap;

pub fn eid(s: &str) -> EntityId {
    EntityId::parse(s).unwrap()
}

pub fn source(s: &str) -> SourceId {
    SourceId::new(s).unwrap()
}

pub fn image_info() -> DataTypeInfo {
    DataTypeInfo::root::<Image>(eid("imaging:image"), "Image").with_category("Images")
}

pub fn mask_info() -> DataTypeInfo {
    DataTypeInfo::derived::<Mask>(eid("imaging:mask"), "Mask", &image_info())
}

pub fn table_info() -> DataTypeInfo {
    DataTypeInfo::root::<CsvTable>(eid("tables:csv"), "CSV table").with_category("Tables")
}

pub fn threshold_node() -> NodeTypeInfo {
    NodeTypeInfo::new::<ThresholdNode>(eid("imaging:threshold"), "Threshold")
        .with_category("Filters")
        .with_input("input", eid("imaging:image"))
        .with_output("mask", eid("imaging:mask"))
}

/// Needs data types from both the imaging and the tables extension.
pub fn measure_node() -> NodeTypeInfo {
    NodeTypeInfo::new::<MeasureNode>(eid("tables:measure"), "Measure")
        .with_category("Analysis")
        .with_input("mask", eid("imaging:mask"))
        .with_output("measurements", eid("tables:csv"))
        .with_parameter("colors", eid("imaging:color-map"))
}

type RegisterFn = dyn Fn(&mut ExtensionHost, &SourceId) -> anyhow::Result<()> + Send + Sync;

/// An extension backed by a closure that counts how often it ran.
pub struct TestExtension {
    pub metadata: ExtensionMetadata,
    register: Box<RegisterFn>,
    pub calls: AtomicUsize,
}

impl TestExtension {
    pub fn new<F>(id: &str, register: F) -> Self
    where
        F: Fn(&mut ExtensionHost, &SourceId) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            metadata: ExtensionMetadata::new(source(id), format!("Test {id}"), "0.1.0"),
            register: Box::new(register),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extension for TestExtension {
    fn metadata(&self) -> ExtensionMetadata {
        self.metadata.clone()
    }

    fn register(&self, host: &mut ExtensionHost) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.register)(host, &self.metadata.id)
    }
}

/// Image and mask data types, the threshold node and the color map parameter.
pub fn imaging_extension() -> TestExtension {
    TestExtension::new("ext.imaging", |host, source| {
        host.register_data_type(image_info(), source)?;
        host.register_data_type(mask_info(), source)?;
        host.register_parameter_type(
            ParameterTypeInfo::new::<ColorMap>(eid("imaging:color-map"), "Color map"),
            source,
        )?;
        host.schedule_node_type(threshold_node(), source);
        Ok(())
    })
}

/// The table data type, an image to table converter and the measure node.
pub fn tables_extension() -> TestExtension {
    TestExtension::new("ext.tables", |host, source| {
        host.register_data_type(table_info(), source)?;
        host.register_converter(
            FnConverter::typed::<Image, CsvTable, _>(image_info(), table_info(), |image| {
                Ok(CsvTable {
                    rows: image.height as usize,
                })
            })
            .into_arc(),
        );
        host.schedule_node_type(measure_node(), source);
        Ok(())
    })
}

pub fn failing_extension(id: &str) -> TestExtension {
    TestExtension::new(id, |_, _| Err(anyhow::anyhow!("native library not found")))
}
