use crate::config::ProductConfig;
use crate::core::processor::CommandRunner;
use crate::types::InsarResult;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::{Path, PathBuf};

/// Unwrapped interferogram written by topsApp (band 1 amplitude, band 2 phase)
pub const UNWRAPPED_RASTER: &str = "merged/filt_topophase.unw.geo";
/// Phase-sigma coherence written by topsApp
pub const COHERENCE_RASTER: &str = "merged/phsig.cor.geo";
/// Line-of-sight geometry, only present when topsApp geocoded it
pub const LOS_RASTER: &str = "merged/los.rdr.geo";

/// Preview image written by `mdx.py -P`
const PREVIEW_PPM: &str = "out.ppm";

/// GeoTIFF products delivered per interferogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductKind {
    Cor,
    Amp,
    Unw,
    Los,
}

impl ProductKind {
    pub const REQUIRED: [ProductKind; 3] = [ProductKind::Cor, ProductKind::Amp, ProductKind::Unw];

    pub fn suffix(&self) -> &'static str {
        match self {
            ProductKind::Cor => "COR",
            ProductKind::Amp => "AMP",
            ProductKind::Unw => "UNW",
            ProductKind::Los => "LOS",
        }
    }

    /// Processor raster and band the product is cut from
    pub fn source(&self) -> (&'static str, u32) {
        match self {
            ProductKind::Cor => (COHERENCE_RASTER, 1),
            ProductKind::Amp => (UNWRAPPED_RASTER, 1),
            ProductKind::Unw => (UNWRAPPED_RASTER, 2),
            ProductKind::Los => (LOS_RASTER, 1),
        }
    }
}

/// Base name shared by all outputs of a pair: `S1-INSAR-<ref>-<sec>`
pub fn product_basename(reference_date: &str, secondary_date: &str) -> String {
    format!("S1-INSAR-{}-{}", reference_date, secondary_date)
}

/// `S1-INSAR-<ref>-<sec>-<KIND>.tif`
pub fn product_name(reference_date: &str, secondary_date: &str, kind: ProductKind) -> String {
    format!("{}-{}.tif", product_basename(reference_date, secondary_date), kind.suffix())
}

/// Turns processor rasters into tiled, compressed GeoTIFFs with overviews
pub struct OutputConverter<'a> {
    runner: &'a dyn CommandRunner,
    config: ProductConfig,
    work_dir: PathBuf,
}

impl<'a> OutputConverter<'a> {
    pub fn new<P: AsRef<Path>>(runner: &'a dyn CommandRunner, config: &ProductConfig, work_dir: P) -> Self {
        Self {
            runner,
            config: config.clone(),
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Band extract → overviews → tiled DEFLATE copy.
    ///
    /// The intermediate GeoTIFF is removed whether or not the stages succeed.
    pub fn convert(&self, input: &Path, band: u32, output: &Path) -> InsarResult<()> {
        log::info!("Converting {} band {} -> {}", input.display(), band, output.display());

        let intermediate = output.with_extension("tmp.tif");
        let outcome = self.run_stages(input, band, &intermediate, output);

        if intermediate.exists() {
            if let Err(e) = fs::remove_file(&intermediate) {
                log::warn!("Failed to remove {}: {}", intermediate.display(), e);
            }
        }
        outcome
    }

    fn run_stages(&self, input: &Path, band: u32, intermediate: &Path, output: &Path) -> InsarResult<()> {
        let intermediate_arg = intermediate.display().to_string();

        let extract = vec![
            "-of".to_string(),
            "GTiff".to_string(),
            "-b".to_string(),
            band.to_string(),
            "-a_nodata".to_string(),
            "0".to_string(),
            input.display().to_string(),
            intermediate_arg.clone(),
        ];
        self.runner.run(&self.config.gdal_translate, &extract, &self.work_dir)?;

        let mut overviews = vec!["-r".to_string(), "average".to_string(), intermediate_arg.clone()];
        overviews.extend(self.config.overview_levels.iter().map(|l| l.to_string()));
        self.runner.run(&self.config.gdaladdo, &overviews, &self.work_dir)?;

        let compress = vec![
            "-co".to_string(),
            "TILED=YES".to_string(),
            "-co".to_string(),
            "COMPRESS=DEFLATE".to_string(),
            "-co".to_string(),
            "COPY_SRC_OVERVIEWS=YES".to_string(),
            intermediate_arg,
            output.display().to_string(),
        ];
        self.runner.run(&self.config.gdal_translate, &compress, &self.work_dir)
    }

    /// Convert every product of the pair; LOS only when the processor wrote it
    pub fn convert_products(&self, reference_date: &str, secondary_date: &str) -> InsarResult<Vec<PathBuf>> {
        let mut kinds = ProductKind::REQUIRED.to_vec();
        if self.work_dir.join(LOS_RASTER).exists() {
            kinds.push(ProductKind::Los);
        }

        let mut outputs = Vec::with_capacity(kinds.len());
        for kind in kinds {
            let (raster, band) = kind.source();
            let output = self.work_dir.join(product_name(reference_date, secondary_date, kind));
            self.convert(&self.work_dir.join(raster), band, &output)?;
            outputs.push(output);
        }
        Ok(outputs)
    }

    /// Reduced-resolution PNG of the unwrapped phase
    pub fn render_preview(&self, reference_date: &str, secondary_date: &str) -> InsarResult<PathBuf> {
        let raster = self.work_dir.join(UNWRAPPED_RASTER);
        let sidecar = PathBuf::from(format!("{}.xml", raster.display()));
        log::info!("Rendering preview from {}", raster.display());

        inject_image_type(&sidecar, "unw")?;

        self.runner.run(
            &self.config.mdx,
            &["-P".to_string(), raster.display().to_string()],
            &self.work_dir,
        )?;

        let ppm = self.work_dir.join(PREVIEW_PPM);
        let output = self.work_dir.join(format!(
            "{}-UNW.png",
            product_basename(reference_date, secondary_date)
        ));
        let resize = vec![
            "-of".to_string(),
            "PNG".to_string(),
            "-outsize".to_string(),
            self.config.preview_width.to_string(),
            "0".to_string(),
            ppm.display().to_string(),
            output.display().to_string(),
        ];
        self.runner.run(&self.config.gdal_translate, &resize, &self.work_dir)?;

        if ppm.exists() {
            fs::remove_file(&ppm)?;
        }
        Ok(output)
    }
}

/// Add `<property name="image_type"><value>..</value></property>` to an ISCE
/// raster sidecar so the preview tool picks the right colour mapping.
/// A sidecar that already declares an image type is left as is.
pub fn inject_image_type(sidecar: &Path, image_type: &str) -> InsarResult<()> {
    let content = fs::read_to_string(sidecar)?;

    let mut reader = Reader::from_str(&content);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;
    let mut declared = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 1 {
                    declared |= is_image_type_property(&e)?;
                }
                depth += 1;
                writer.write_event(Event::Start(e))?;
            }
            Event::Empty(e) => {
                if depth == 1 {
                    declared |= is_image_type_property(&e)?;
                }
                writer.write_event(Event::Empty(e))?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && !declared {
                    let mut property = BytesStart::new("property");
                    property.push_attribute(("name", "image_type"));
                    writer.write_event(Event::Start(property))?;
                    writer.write_event(Event::Start(BytesStart::new("value")))?;
                    writer.write_event(Event::Text(BytesText::new(image_type)))?;
                    writer.write_event(Event::End(BytesEnd::new("value")))?;
                    writer.write_event(Event::End(BytesEnd::new("property")))?;
                    writer.write_event(Event::Text(BytesText::new("\n")))?;
                    declared = true;
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    fs::write(sidecar, writer.into_inner())?;
    Ok(())
}

fn is_image_type_property(element: &BytesStart<'_>) -> InsarResult<bool> {
    if element.name().as_ref() != b"property" {
        return Ok(false);
    }
    Ok(match element.try_get_attribute("name")? {
        Some(attr) => attr.value.as_ref() == b"image_type",
        None => false,
    })
}
