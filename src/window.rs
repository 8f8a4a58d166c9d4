use crate::{
    error::{ PanoError, PanoResult },
    horizon::{ HorizonPoint, HorizonSource },
    timer::Timer,
};

use sdl2::{
    EventPump,
    event::{ Event, WindowEvent },
    keyboard::Keycode,
    mouse::MouseButton,
    video::{ Window, WindowContext },
    render::{ Canvas, TextureCreator, Texture },
    pixels::{ PixelFormatEnum, Color },
    rect::{ Rect, Point },
};

use image::RgbImage;

/// Half the side of the square drawn around a marked point, in screen pixels.
const MARKER: i32 = 6;

/// What ended a wait on the event pump.
enum Step{
    Click(HorizonPoint),
    Undo,
    Done,
}

/// SDL window showing one raster letterboxed, turning clicks into image pixel
/// coordinates.
pub struct ClickWindow{
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    event_pump: EventPump,
    texture: Option<(Texture, u32, u32)>,
    markers: Vec<HorizonPoint>,
    winw: u32,
    winh: u32,
    imgx: i32,
    imgy: i32,
    imgw: u32,
    imgh: u32,
}

impl ClickWindow{
    pub fn create() -> PanoResult<Self>{
        let timer = Timer::new();
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;

        let window = video_subsystem
            .window("equirect", 1024, 640)
            .resizable()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = canvas.texture_creator();
        let event_pump = sdl_context.event_pump()?;
        let (winw, winh) = canvas.window().size();

        log::debug!("Window: {:?}ms", timer.elapsed());
        Ok(Self{
            canvas,
            texture_creator,
            event_pump,
            texture: None,
            markers: Vec::new(),
            winw,
            winh,
            imgx: 0,
            imgy: 0,
            imgw: 1,
            imgh: 1,
        })
    }

    pub fn set_image(&mut self, img: &RgbImage, title: &str) -> PanoResult<()>{
        let timer = Timer::new();
        let (imgw, imgh) = img.dimensions();
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::RGB24, imgw, imgh)
            .map_err(|e| e.to_string())?;
        texture.update(None, img.as_raw(), 3 * imgw as usize).map_err(|e| e.to_string())?;
        self.texture = Some((texture, imgw, imgh));
        self.markers.clear();
        self.canvas.window_mut().set_title(title).map_err(|e| e.to_string())?;
        log::debug!("Texture: {:?}ms", timer.elapsed());
        self.redraw()
    }

    /// Shows `img` until the user presses a key or closes the window.
    pub fn show(&mut self, img: &RgbImage, title: &str) -> PanoResult<()>{
        self.set_image(img, title)?;
        while !matches!(self.next_step()?, Step::Done){}
        Ok(())
    }

    fn next_step(&mut self) -> PanoResult<Step>{
        loop{
            match self.event_pump.wait_event(){
                Event::Quit { .. }
                | Event::KeyDown { keycode: Some(Keycode::Escape), .. }
                | Event::KeyDown { keycode: Some(Keycode::Return), .. } => {
                    return Ok(Step::Done);
                },
                Event::KeyDown { keycode: Some(Keycode::Backspace), .. }
                | Event::MouseButtonDown { mouse_btn: MouseButton::Right, .. } => {
                    return Ok(Step::Undo);
                },
                Event::MouseButtonDown { mouse_btn: MouseButton::Left, x, y, .. } => {
                    if let Some(p) = self.screen_to_image(x, y){
                        return Ok(Step::Click(p));
                    }
                },
                Event::Window { win_event: WindowEvent::Resized(winw, winh), .. } => {
                    (self.winw, self.winh) = window_size(winw, winh);
                    self.redraw()?;
                },
                Event::Window { win_event: WindowEvent::Exposed, .. } => {
                    self.redraw()?;
                },
                _ => {},
            }
        }
    }

    fn screen_to_image(&self, x: i32, y: i32) -> Option<HorizonPoint>{
        let (_, texw, texh) = self.texture.as_ref()?;
        let view = (self.imgx, self.imgy, self.imgw, self.imgh);
        screen_to_image(x, y, view, (*texw, *texh))
    }

    fn redraw(&mut self) -> PanoResult<()>{
        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        self.canvas.clear();
        if let Some((texture, texw, texh)) = &self.texture{
            let (x, y, w, h) = resize_dims(*texw, *texh, self.winw, self.winh);
            self.canvas.copy(texture, None, Some(Rect::new(x, y, w, h)))?;
            self.imgx = x;
            self.imgy = y;
            self.imgw = w;
            self.imgh = h;
        }
        let markers = std::mem::take(&mut self.markers);
        for m in &markers{
            self.draw_marker(*m)?;
        }
        self.markers = markers;
        self.canvas.present();
        Ok(())
    }

    fn draw_marker(&mut self, p: HorizonPoint) -> PanoResult<()>{
        let (texw, texh) = match &self.texture{
            Some((_, w, h)) => (*w, *h),
            None => return Ok(()),
        };
        let cx = (p.x / texw as f32 * self.imgw as f32) as i32 + self.imgx;
        let cy = (p.y / texh as f32 * self.imgh as f32) as i32 + self.imgy;
        let (px, py, qx, qy) = (cx - MARKER, cy - MARKER, cx + MARKER, cy + MARKER);
        let draw_point_box = |skip: usize, canvas: &mut Canvas<Window>| -> Result<(), String>{
            let t = (px..qx).skip(skip).step_by(2).map(|x| Point::new(x, py)).collect::<Vec<_>>();
            let b = (px..qx).skip(skip).step_by(2).map(|x| Point::new(x, qy)).collect::<Vec<_>>();
            let l = (py..qy).skip(skip).step_by(2).map(|y| Point::new(px, y)).collect::<Vec<_>>();
            let r = (py..qy).skip(skip).step_by(2).map(|y| Point::new(qx, y)).collect::<Vec<_>>();
            canvas.draw_points(t.as_slice())?;
            canvas.draw_points(b.as_slice())?;
            canvas.draw_points(l.as_slice())?;
            canvas.draw_points(r.as_slice())?;
            // the horizon line through the point
            canvas.draw_line(Point::new(px - MARKER, cy), Point::new(qx + MARKER, cy))?;
            Ok(())
        };
        self.canvas.set_draw_color(Color::RGB(255, 255, 255));
        draw_point_box(0, &mut self.canvas)?;
        self.canvas.set_draw_color(Color::RGB(0, 0, 0));
        draw_point_box(1, &mut self.canvas)?;
        Ok(())
    }
}

impl HorizonSource for ClickWindow{
    fn collect(&mut self, img: &RgbImage, max_points: usize) -> PanoResult<Vec<HorizonPoint>>{
        let title = format!("Click up to {} points to define the horizon (Return when done)", max_points);
        self.set_image(img, &title)?;
        while self.markers.len() < max_points{
            match self.next_step()?{
                Step::Click(p) => {
                    log::info!("Horizon point {}: ({:.0}, {:.0})", self.markers.len() + 1, p.x, p.y);
                    self.markers.push(p);
                },
                Step::Undo => {
                    if let Some(p) = self.markers.pop(){
                        log::info!("Removed horizon point ({:.0}, {:.0})", p.x, p.y);
                    }
                },
                Step::Done => break,
            }
            self.redraw()?;
        }
        Ok(std::mem::take(&mut self.markers))
    }
}

/// Opens the SDL window the first time it is needed, so a run that fails
/// before the horizon step never shows one.
#[derive(Default)]
pub struct LazyWindow{
    inner: Option<ClickWindow>,
}

impl LazyWindow{
    pub fn get(&mut self) -> PanoResult<&mut ClickWindow>{
        if self.inner.is_none(){
            self.inner = Some(ClickWindow::create()?);
        }
        self.inner.as_mut().ok_or_else(|| PanoError::Io("window went away".to_string()))
    }
}

impl HorizonSource for LazyWindow{
    fn collect(&mut self, img: &RgbImage, max_points: usize) -> PanoResult<Vec<HorizonPoint>>{
        self.get()?.collect(img, max_points)
    }
}

/// SDL reports sizes as signed ints.
fn window_size(w: i32, h: i32) -> (u32, u32){
    (w.max(0) as u32, h.max(0) as u32)
}

/// Maps a screen position to raster pixels given where the raster is drawn.
/// Clicks in the letterbox bars yield nothing.
fn screen_to_image(x: i32, y: i32, view: (i32, i32, u32, u32), tex: (u32, u32)) -> Option<HorizonPoint>{
    let (vx, vy, vw, vh) = view;
    if vw == 0 || vh == 0{
        return None;
    }
    let u = (x - vx) as f32 / vw as f32;
    let v = (y - vy) as f32 / vh as f32;
    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v){
        return None;
    }
    Some(HorizonPoint::new(u * tex.0 as f32, v * tex.1 as f32))
}

fn resize_dims(imgw: u32, imgh: u32, winw: u32, winh: u32) -> (i32, i32, u32, u32){
    let wfac = winw as f32 / imgw as f32;
    let hfac = winh as f32 / imgh as f32;
    let fac = wfac.min(hfac);
    let w = (imgw as f32 * fac) as u32;
    let h = (imgh as f32 * fac) as u32;
    let x = if w + 2 < winw { (winw - w) / 2 } else { 0 } as i32;
    let y = if h + 2 < winh { (winh - h) / 2 } else { 0 } as i32;
    (x, y, w, h)
}
