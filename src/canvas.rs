use std::io;
use std::io::{ BufWriter, Write };
use std::fs::File;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex };

use log::debug;

use crate::color::Color;
use crate::error::Result;

/// Where a camera writes the colors it computes.
///
/// Every pixel is written once per render; `commit` is called once after the
/// last pixel has been written.
pub trait PixelSink: Send {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Stores a color at column `x`, row `y`. Out-of-bounds pixels are
    /// ignored.
    fn write_pixel(&mut self, x: usize, y: usize, color: &Color);

    /// Flushes the written pixels to wherever they are meant to end up.
    fn commit(&mut self) -> Result<()>;
}

/// A canvas for drawing pixels.
///
/// This structure mostly stores the results of the ray tracer. The canvas
/// stores the resultant colors for each pixel; committing a bare canvas does
/// nothing. Wrap it in a `PpmImage` to save it to a file.
#[derive(Clone, Default, Debug, PartialEq)]
pub struct Canvas {
    /// The width of the canvas, in pixels.
    pub width: usize,

    /// The height of the canvas, in pixels.
    pub height: usize,

    /// The pixels of the canvas, stored as a flattened vector.
    pixels: Vec<Color>,
}

impl Canvas {
    /// Creates a black canvas with specified width and height.
    pub fn new(width: usize, height: usize) -> Canvas {
        Canvas {
            width,
            height,
            pixels: vec![Color::black(); width * height]
        }
    }

    /// Reads a color from a location on the `Canvas`.
    ///
    /// Pixels are specified in column-row order, where `x` is the column of
    /// the pixel and `y` is the row. If the specified pixel location is
    /// out-of-bounds, `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// # use whitted::color::Color;
    /// # use whitted::canvas::{ Canvas, PixelSink };
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let mut canvas = Canvas::new(8, 8);
    /// canvas.write_pixel(4, 2, &purple);
    /// assert_eq!(canvas.read_pixel(4, 2).unwrap(), purple);
    /// assert!(canvas.read_pixel(8, 2).is_none());
    /// ```
    pub fn read_pixel(&self, x: usize, y: usize) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None
        }

        Some(self.pixels[(y * self.width) + x])
    }

    /// Writes the canvas as a plain PPM (`P3`) image.
    ///
    /// Channels are scaled from `[0, 1]` to `[0, 255]` and clamped. Lines are
    /// kept within 70 columns.
    pub fn write_ppm<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "P3")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        let mut col = 0;
        for pixel in self.pixels.iter() {
            for channel in [pixel.r, pixel.g, pixel.b] {
                let value = (channel * 255.0).clamp(0.0, 255.0).round() as u8;
                let text = value.to_string();

                if col == 0 {
                    write!(out, "{}", text)?;
                    col = text.len();
                } else if col + 1 + text.len() > 70 {
                    write!(out, "\n{}", text)?;
                    col = text.len();
                } else {
                    write!(out, " {}", text)?;
                    col += 1 + text.len();
                }
            }
        }

        writeln!(out)?;
        Ok(())
    }

    /// Saves the canvas to a PPM file.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_ppm(&mut out)?;
        out.flush()
    }
}

impl PixelSink for Canvas {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        // Silently ignore out-of-bounds pixels
        if x >= self.width || y >= self.height {
            return;
        }

        self.pixels[(y * self.width) + x] = *color;
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A canvas shared with the caller, who can read the pixels back after the
/// camera is done with it.
impl PixelSink for Arc<Mutex<Canvas>> {
    fn width(&self) -> usize {
        self.lock().map(|c| c.width).unwrap_or(0)
    }

    fn height(&self) -> usize {
        self.lock().map(|c| c.height).unwrap_or(0)
    }

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        if let Ok(mut canvas) = self.lock() {
            canvas.write_pixel(x, y, color);
        }
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A canvas which is saved to a PPM file on commit.
#[derive(Clone, Debug)]
pub struct PpmImage {
    canvas: Canvas,
    path: PathBuf,
}

impl PpmImage {
    pub fn new<P: Into<PathBuf>>(path: P, width: usize, height: usize) -> PpmImage {
        PpmImage { canvas: Canvas::new(width, height), path: path.into() }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PixelSink for PpmImage {
    fn width(&self) -> usize {
        self.canvas.width
    }

    fn height(&self) -> usize {
        self.canvas.height
    }

    fn write_pixel(&mut self, x: usize, y: usize, color: &Color) {
        self.canvas.write_pixel(x, y, color);
    }

    fn commit(&mut self) -> Result<()> {
        self.canvas.save(&self.path)?;
        debug!(
            "wrote {}x{} image to {}",
            self.canvas.width, self.canvas.height, self.path.display()
        );

        Ok(())
    }
}

#[test]
fn new_canvas_is_black() {
    let c = Canvas::new(10, 20);

    assert_eq!(c.width, 10);
    assert_eq!(c.height, 20);
    assert_eq!(c.read_pixel(9, 19), Some(Color::black()));
    assert_eq!(c.read_pixel(10, 0), None);
}

#[test]
fn ppm_header_and_pixels() {
    let mut c = Canvas::new(5, 3);
    c.write_pixel(0, 0, &Color::rgb(1.5, 0.0, 0.0));
    c.write_pixel(2, 1, &Color::rgb(0.0, 0.5, 0.0));
    c.write_pixel(4, 2, &Color::rgb(-0.5, 0.0, 1.0));

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "P3");
    assert_eq!(lines[1], "5 3");
    assert_eq!(lines[2], "255");
    assert!(text.ends_with('\n'));

    let values: Vec<&str> = text.split_whitespace().skip(4).collect();
    assert_eq!(values.len(), 45);
    assert_eq!(&values[0..3], &["255", "0", "0"]);
    assert_eq!(&values[21..24], &["0", "128", "0"]);
    assert_eq!(&values[42..45], &["0", "0", "255"]);
}

#[test]
fn ppm_lines_stay_within_70_columns() {
    let mut c = Canvas::new(10, 2);
    for y in 0..2 {
        for x in 0..10 {
            c.write_pixel(x, y, &Color::rgb(1.0, 0.8, 0.6));
        }
    }

    let mut out = Vec::new();
    c.write_ppm(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.lines().all(|l| l.len() <= 70));
    assert_eq!(text.split_whitespace().skip(4).count(), 60);
}
