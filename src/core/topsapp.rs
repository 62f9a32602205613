//! topsApp.xml rendering
//!
//! The document is the only input of the interferometric processor. It is
//! written to a fixed name inside the staging directory and replaced on every
//! run.

use crate::config::ProcessorConfig;
use crate::types::{DemChoice, GranuleDescriptor, InsarResult};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "topsApp.xml";

/// Fills the topsApp document from two staged granules
pub struct TopsAppRenderer {
    processor: ProcessorConfig,
    output_path: PathBuf,
}

impl TopsAppRenderer {
    pub fn new<P: AsRef<Path>>(processor: &ProcessorConfig, work_dir: P) -> Self {
        Self {
            processor: processor.clone(),
            output_path: work_dir.as_ref().join(CONFIG_FILE_NAME),
        }
    }

    /// Where the document is written
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the document, overwriting the previous run's copy
    pub fn render_configuration(
        &self,
        reference: &GranuleDescriptor,
        secondary: &GranuleDescriptor,
        dem: DemChoice,
    ) -> InsarResult<PathBuf> {
        log::info!("Writing {}", self.output_path.display());

        let document = self.render_document(reference, secondary, dem)?;
        fs::write(&self.output_path, document)?;
        Ok(self.output_path.clone())
    }

    pub fn render_document(
        &self,
        reference: &GranuleDescriptor,
        secondary: &GranuleDescriptor,
        dem: DemChoice,
    ) -> InsarResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Start(BytesStart::new("topsApp")))?;
        start_component(&mut writer, "topsinsar")?;

        property(&mut writer, "Sensor name", "SENTINEL1")?;
        granule_component(&mut writer, "reference", reference)?;
        granule_component(&mut writer, "secondary", secondary)?;

        let swaths: Vec<String> = self.processor.swaths.iter().map(|s| s.to_string()).collect();
        property(&mut writer, "swaths", &format!("[{}]", swaths.join(", ")))?;
        property(&mut writer, "azimuth looks", &self.processor.azimuth_looks.to_string())?;
        property(&mut writer, "range looks", &self.processor.range_looks.to_string())?;
        property(&mut writer, "do unwrap", "True")?;
        property(&mut writer, "unwrapper name", &self.processor.unwrapper)?;

        // Auto: topsApp downloads a DEM itself, nothing to override
        if dem == DemChoice::Srtm {
            property(&mut writer, "useHighResolutionDemOnly", "True")?;
        }

        writer.write_event(Event::End(BytesEnd::new("component")))?;
        writer.write_event(Event::End(BytesEnd::new("topsApp")))?;

        let mut document = String::from_utf8_lossy(&writer.into_inner()).into_owned();
        document.push('\n');
        Ok(document)
    }
}

fn start_component(writer: &mut Writer<Vec<u8>>, name: &str) -> InsarResult<()> {
    let mut start = BytesStart::new("component");
    start.push_attribute(("name", name));
    writer.write_event(Event::Start(start))?;
    Ok(())
}

fn property(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> InsarResult<()> {
    let mut start = BytesStart::new("property");
    start.push_attribute(("name", name));
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(value))))?;
    writer.write_event(Event::End(BytesEnd::new("property")))?;
    Ok(())
}

fn granule_component(writer: &mut Writer<Vec<u8>>, role: &str, granule: &GranuleDescriptor) -> InsarResult<()> {
    start_component(writer, role)?;
    property(writer, "safe", &format!("['{}']", granule.working_directory.display()))?;
    property(writer, "orbit file", &granule.orbit_file.display().to_string())?;
    property(writer, "output directory", role)?;
    writer.write_event(Event::End(BytesEnd::new("component")))?;
    Ok(())
}
