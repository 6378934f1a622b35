#![allow(dead_code)]

use pipeforge_convert::{
    Data, DataTypeInfo, DataValue, DatatypeRegistry, FnConverter, upcast_through,
};
use pipeforge_types::{EntityId, SourceId};
use std::any::{Any, TypeId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
}

impl Data for Image {}

#[derive(Debug, Clone, PartialEq)]
pub struct GreyscaleImage {
    pub image: Image,
    pub levels: u16,
}

impl Data for GreyscaleImage {
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        upcast_through(self, target, &self.image)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    pub greyscale: GreyscaleImage,
}

impl Data for Mask {
    fn upcast(&self, target: TypeId) -> Option<&dyn Any> {
        upcast_through(self, target, &self.greyscale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    pub rows: Vec<Vec<String>>,
}

impl Data for CsvTable {}

#[derive(Debug, Clone, PartialEq)]
pub struct JsonReport {
    pub body: String,
}

impl Data for JsonReport {}

#[derive(Debug, Clone, PartialEq)]
pub struct Unrelated;

impl Data for Unrelated {}

pub fn eid(s: &str) -> EntityId {
    EntityId::parse(s).unwrap()
}

pub fn core() -> SourceId {
    SourceId::core()
}

pub fn mask(width: u32, height: u32) -> Mask {
    Mask {
        greyscale: GreyscaleImage {
            image: Image { width, height },
            levels: 2,
        },
    }
}

pub struct Infos {
    pub image: DataTypeInfo,
    pub greyscale: DataTypeInfo,
    pub mask: DataTypeInfo,
    pub table: DataTypeInfo,
    pub report: DataTypeInfo,
    pub unrelated: DataTypeInfo,
}

pub fn infos() -> Infos {
    let image = DataTypeInfo::root::<Image>(eid("imaging:image"), "Image").with_category("Images");
    let greyscale = DataTypeInfo::derived::<GreyscaleImage>(eid("imaging:greyscale"), "Greyscale image", &image);
    let mask = DataTypeInfo::derived::<Mask>(eid("imaging:mask"), "Mask", &greyscale);
    let table = DataTypeInfo::root::<CsvTable>(eid("tables:csv"), "CSV table").with_category("Tables");
    let report = DataTypeInfo::root::<JsonReport>(eid("tables:report"), "Report");
    let unrelated = DataTypeInfo::root::<Unrelated>(eid("misc:unrelated"), "Unrelated").hidden();
    Infos {
        image,
        greyscale,
        mask,
        table,
        report,
        unrelated,
    }
}

/// An `Image -> CsvTable` converter that counts its invocations.
pub fn image_to_table(infos: &Infos, calls: Arc<AtomicUsize>) -> FnConverter {
    FnConverter::typed::<Image, CsvTable, _>(infos.image.clone(), infos.table.clone(), move |image| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(CsvTable {
            rows: vec![vec![image.width.to_string(), image.height.to_string()]],
        })
    })
}

pub fn table_to_report(infos: &Infos) -> FnConverter {
    FnConverter::typed::<CsvTable, JsonReport, _>(infos.table.clone(), infos.report.clone(), |table| {
        Ok(JsonReport {
            body: format!("{} rows", table.rows.len()),
        })
    })
}

/// Image hierarchy, tables, and an `Image -> CsvTable` converter.
pub fn imaging_registry(calls: Arc<AtomicUsize>) -> DatatypeRegistry {
    let infos = infos();
    let mut registry = DatatypeRegistry::new();
    for info in [
        infos.image.clone(),
        infos.greyscale.clone(),
        infos.mask.clone(),
        infos.table.clone(),
        infos.report.clone(),
        infos.unrelated.clone(),
    ] {
        registry.register(info, &core()).unwrap();
    }
    registry.register_converter(image_to_table(&infos, calls).into_arc());
    registry
}

pub fn value<T: Data>(data: T) -> DataValue {
    Arc::new(data)
}
