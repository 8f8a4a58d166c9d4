use crate::{
    blend::{ blend_seam, effective_strip_width, raster_from_dynamic, STRIP_WIDTH },
    error::PanoResult,
    horizon::{ horizon_y, HorizonSource, MAX_HORIZON_POINTS },
    pad::{ pad_to_equirect, Padding, EQUIRECT_ASPECT },
    timer::Timer,
};

use image::{ ImageReader as IR, RgbImage };

use std::path::{ Path, PathBuf };

#[derive(Debug, Clone)]
pub struct Config{
    pub input: PathBuf,
    pub output: PathBuf,
    pub strip_width: u32,
    pub target_aspect: f64,
    pub max_points: usize,
}

impl Config{
    /// The one fixed transform: 150 column strips, 2:1, three points.
    pub fn new(input: PathBuf, output: Option<PathBuf>) -> Self{
        let output = output.unwrap_or_else(|| default_output(&input));
        Self{
            input,
            output,
            strip_width: STRIP_WIDTH,
            target_aspect: EQUIRECT_ASPECT,
            max_points: MAX_HORIZON_POINTS,
        }
    }
}

/// Same file name as the input, in the working directory.
pub fn default_output(input: &Path) -> PathBuf{
    match input.file_name(){
        Some(name) => PathBuf::from(name),
        None => PathBuf::from("equirect.png"),
    }
}

/// Where rasters come from and go to.
pub trait RasterStore{
    fn load(&self, path: &Path) -> PanoResult<RgbImage>;
    fn save(&self, img: &RgbImage, path: &Path) -> PanoResult<()>;
}

/// Reads and writes image files, format picked from content and extension.
pub struct FileStore;

impl RasterStore for FileStore{
    fn load(&self, path: &Path) -> PanoResult<RgbImage>{
        let img = IR::open(path)?
            .with_guessed_format()?
            .decode()?;
        raster_from_dynamic(img)
    }

    fn save(&self, img: &RgbImage, path: &Path) -> PanoResult<()>{
        img.save(path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report{
    pub original: (u32, u32),
    pub strip_width: u32,
    pub horizon_y: u32,
    pub padding: Padding,
    pub output: PathBuf,
}

pub struct Outcome{
    pub report: Report,
    pub raster: RgbImage,
}

/// decode, blend, collect the horizon, pad, save. Nothing is written unless
/// every stage before the save succeeded.
pub fn run(config: &Config, store: &impl RasterStore, horizon: &mut dyn HorizonSource) -> PanoResult<Outcome>{
    let mut timer = Timer::new();

    let img = store.load(&config.input)?;
    let (w, h) = img.dimensions();
    log::info!("Original image size: {}x{}", w, h);
    timer.lap("Decode");

    let strip_width = effective_strip_width(w, config.strip_width);
    if strip_width < config.strip_width{
        log::warn!("Image is only {}px wide, blending {}px strips instead of {}px", w, strip_width, config.strip_width);
    }
    let img = blend_seam(&img, config.strip_width);
    timer.lap("Blend");

    let points = horizon.collect(&img, config.max_points)?;
    let horizon_y = horizon_y(&points, h)?;
    log::info!("Averaged horizon Y = {}", horizon_y);
    timer.checkpoint();

    let (raster, padding) = pad_to_equirect(&img, horizon_y, config.target_aspect)?;
    log::info!(
        "Padded image size: {}x{}, padding above: {}, below: {}",
        raster.width(), raster.height(), padding.pad_above, padding.pad_below
    );
    timer.lap("Pad");

    if same_file(&config.input, &config.output){
        log::warn!("Overwriting the input image {}", config.input.display());
    }
    store.save(&raster, &config.output)?;
    log::info!("Saved as {}", config.output.display());
    timer.lap("Encode");

    Ok(Outcome{
        report: Report{
            original: (w, h),
            strip_width,
            horizon_y,
            padding,
            output: config.output.clone(),
        },
        raster,
    })
}

fn same_file(a: &Path, b: &Path) -> bool{
    match (a.canonicalize(), b.canonicalize()){
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests{

    use super::*;
    use crate::{
        error::PanoError,
        horizon::{ FixedPoints, HorizonPoint },
    };
    use image::Rgb;
    use std::{ cell::RefCell, collections::HashMap };

    #[derive(Default)]
    struct MemStore{
        files: RefCell<HashMap<PathBuf, RgbImage>>,
    }

    impl MemStore{
        fn with(path: &str, img: RgbImage) -> Self{
            let store = Self::default();
            store.files.borrow_mut().insert(PathBuf::from(path), img);
            store
        }
    }

    impl RasterStore for MemStore{
        fn load(&self, path: &Path) -> PanoResult<RgbImage>{
            self.files.borrow().get(path).cloned()
                .ok_or_else(|| PanoError::Io(format!("no such file {}", path.display())))
        }

        fn save(&self, img: &RgbImage, path: &Path) -> PanoResult<()>{
            self.files.borrow_mut().insert(path.to_path_buf(), img.clone());
            Ok(())
        }
    }

    fn config() -> Config{
        Config::new(PathBuf::from("org/pano.jpg"), None)
    }

    fn points(ys: &[f32]) -> FixedPoints{
        FixedPoints(ys.iter().map(|y| HorizonPoint::new(10.0, *y)).collect())
    }

    #[test]
    fn test_default_output(){
        assert_eq!(default_output(Path::new("./org/IMG_4189.JPG")), PathBuf::from("IMG_4189.JPG"));
        assert_eq!(config().output, PathBuf::from("pano.jpg"));
        let c = Config::new(PathBuf::from("a.png"), Some(PathBuf::from("out/b.png")));
        assert_eq!(c.output, PathBuf::from("out/b.png"));
        assert_eq!((c.strip_width, c.max_points), (150, 3));
    }

    #[test]
    fn test_full_run(){
        let img = RgbImage::from_fn(1200, 400, |x, _| {
            if x < 150 { Rgb([200, 0, 0]) } else if x >= 1050 { Rgb([0, 0, 100]) } else { Rgb([7, 7, 7]) }
        });
        let store = MemStore::with("org/pano.jpg", img);
        let out = run(&config(), &store, &mut points(&[90.0, 100.0, 110.0])).unwrap();

        assert_eq!(out.report.original, (1200, 400));
        assert_eq!(out.report.strip_width, 150);
        assert_eq!(out.report.horizon_y, 100);
        assert_eq!(out.report.padding, Padding{ target_height: 600, pad_above: 150, pad_below: 50 });

        let saved = store.files.borrow().get(Path::new("pano.jpg")).cloned().unwrap();
        assert_eq!(saved, out.raster);
        assert_eq!(saved.get_pixel(0, 150), &Rgb([100, 0, 50]));
        assert_eq!(saved.get_pixel(1199, 549), &Rgb([100, 0, 50]));
        assert_eq!(saved.get_pixel(600, 300), &Rgb([7, 7, 7]));
        assert_eq!(saved.get_pixel(600, 0), &Rgb([0, 0, 0]));
        assert_eq!(saved.get_pixel(600, 599), &Rgb([0, 0, 0]));
    }

    #[test]
    fn test_no_points_writes_nothing(){
        let store = MemStore::with("org/pano.jpg", RgbImage::new(1200, 400));
        let res = run(&config(), &store, &mut points(&[]));
        assert!(matches!(res, Err(PanoError::NoHorizonSelected)));
        assert_eq!(store.files.borrow().len(), 1);
    }

    #[test]
    fn test_too_tall_writes_nothing(){
        let store = MemStore::with("org/pano.jpg", RgbImage::new(600, 400));
        let res = run(&config(), &store, &mut points(&[10.0]));
        assert!(matches!(res, Err(PanoError::ImageAlreadyTooTall{ target: 300, height: 400 })));
        assert_eq!(store.files.borrow().len(), 1);
    }

    struct NeverAsked;

    impl HorizonSource for NeverAsked{
        fn collect(&mut self, _img: &RgbImage, _max_points: usize) -> PanoResult<Vec<HorizonPoint>>{
            panic!("horizon requested before the input decoded");
        }
    }

    fn temp_path(name: &str) -> PathBuf{
        std::env::temp_dir().join(format!("equirect-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_file_store_round_trip(){
        let input = temp_path("round-trip-in.png");
        let output = temp_path("round-trip-out.png");
        let img = RgbImage::from_fn(400, 100, |x, _| if x < 200 { Rgb([40, 80, 120]) } else { Rgb([0, 0, 0]) });
        image::DynamicImage::ImageRgb8(img).into_rgba8().save(&input).unwrap();

        let config = Config::new(input.clone(), Some(output.clone()));
        let res = run(&config, &FileStore, &mut points(&[50.0]));
        let saved = image::open(&output).map(|i| i.into_rgb8());
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);

        let out = res.unwrap();
        assert_eq!(out.report.padding, Padding{ target_height: 200, pad_above: 50, pad_below: 50 });
        let saved = saved.unwrap();
        assert_eq!(saved.dimensions(), (400, 200));
        assert_eq!(saved, out.raster);
        assert_eq!(saved.get_pixel(200, 49), &Rgb([0, 0, 0]));
        assert_eq!(saved.get_pixel(180, 50), &Rgb([40, 80, 120]));
        assert_eq!(saved.get_pixel(180, 149), &Rgb([40, 80, 120]));
        assert_eq!(saved.get_pixel(180, 150), &Rgb([0, 0, 0]));
        // blended strips: (40 + 0 + 1) / 2 = 20
        assert_eq!(saved.get_pixel(0, 50), &Rgb([20, 40, 60]));
        assert_eq!(saved.get_pixel(399, 50), &Rgb([20, 40, 60]));
    }

    #[test]
    fn test_file_store_missing_input(){
        let input = temp_path("does-not-exist.png");
        let output = temp_path("missing-out.png");
        let config = Config::new(input, Some(output.clone()));
        let res = run(&config, &FileStore, &mut NeverAsked);
        assert!(matches!(res, Err(PanoError::Io(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_file_store_undecodable_input(){
        let input = temp_path("garbage.bin");
        let output = temp_path("garbage-out.png");
        std::fs::write(&input, b"definitely not an image").unwrap();
        let res = run(&Config::new(input.clone(), Some(output.clone())), &FileStore, &mut NeverAsked);
        let _ = std::fs::remove_file(&input);
        assert!(matches!(res, Err(PanoError::InvalidImageFormat(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input(){
        let store = MemStore::default();
        assert!(matches!(run(&config(), &store, &mut NeverAsked), Err(PanoError::Io(_))));
    }
}
