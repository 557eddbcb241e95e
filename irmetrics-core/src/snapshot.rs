//! Engine adapter over exported IR snapshots.
//!
//! Bytecode lowering happens in an external engine which exports one JSON
//! snapshot per class. [`SnapshotEngine`] serves those snapshots through the
//! [`IrEngine`] contract. It performs no analysis of its own: resolution is a
//! name lookup, and `reset` restores the state as loaded so pre-transform
//! edits never outlive their session.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{IoResultExt, IrMetricsError, IrMetricsResult};
use crate::ir::{IrClass, IrEngine};
use crate::scan::{class_name_for, gather_class_files};

pub struct SnapshotEngine {
    /// State as loaded, restored on reset.
    pristine: Vec<IrClass>,
    /// Class name → index into `classes`.
    index: HashMap<String, usize>,
    classes: Vec<IrClass>,
}

impl SnapshotEngine {
    /// Loads every snapshot below `classpath`.
    ///
    /// Files are decoded in parallel; a malformed file fails the load, since
    /// a partially loaded classpath would silently drop classes.
    pub fn open(classpath: &Path) -> IrMetricsResult<Self> {
        if !classpath.is_dir() {
            return Err(IrMetricsError::config(
                classpath,
                "classpath is not a directory",
            ));
        }

        let files = gather_class_files(classpath)
            .map_err(|e| IrMetricsError::config(classpath, format!("{:#}", e)))?;

        let classes = files
            .par_iter()
            .map(|file| load_snapshot(classpath, file))
            .collect::<IrMetricsResult<Vec<_>>>()?;

        debug!(
            classpath = %classpath.display(),
            classes = classes.len(),
            "class snapshots loaded"
        );

        Ok(Self::from_classes(classes))
    }

    /// Builds an engine from classes already in memory.
    pub fn from_classes(classes: impl IntoIterator<Item = IrClass>) -> Self {
        let mut classes: Vec<IrClass> = classes.into_iter().collect();
        classes.sort_by(|a, b| a.name.cmp(&b.name));
        classes.dedup_by(|later, first| {
            let duplicate = later.name == first.name;
            if duplicate {
                warn!(class = %later.name, "duplicate class snapshot ignored");
            }
            duplicate
        });

        let mut engine = Self {
            pristine: classes,
            index: HashMap::new(),
            classes: Vec::new(),
        };
        engine.reset();
        engine
    }
}

fn load_snapshot(classpath: &Path, file: &Path) -> IrMetricsResult<IrClass> {
    let text = fs::read_to_string(file).with_path(file)?;
    let mut class: IrClass =
        serde_json::from_str(&text).map_err(|e| IrMetricsError::snapshot(file, e.to_string()))?;

    if let Some(expected) = class_name_for(classpath, file) {
        if expected != class.name {
            warn!(
                file = %file.display(),
                declared = %class.name,
                "snapshot location does not match declared class name"
            );
        }
    }

    // Snapshots may omit the declaring class on methods.
    for method in &mut class.methods {
        if method.declaring_class.is_empty() {
            method.declaring_class = class.name.clone();
        }
    }

    Ok(class)
}

impl IrEngine for SnapshotEngine {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn class_names(&self) -> Vec<String> {
        self.classes.iter().map(|c| c.name.clone()).collect()
    }

    fn resolve(&self, class_name: &str) -> IrMetricsResult<&IrClass> {
        self.index
            .get(class_name)
            .map(|&i| &self.classes[i])
            .ok_or_else(|| IrMetricsError::resolution(class_name, "not present on the classpath"))
    }

    fn resolve_mut(&mut self, class_name: &str) -> IrMetricsResult<&mut IrClass> {
        match self.index.get(class_name) {
            Some(&i) => Ok(&mut self.classes[i]),
            None => Err(IrMetricsError::resolution(
                class_name,
                "not present on the classpath",
            )),
        }
    }

    fn reset(&mut self) {
        self.classes = self.pristine.clone();
        self.index = self
            .classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name.clone(), i))
            .collect();
    }
}
