use biome_core::backend::gpu::{ImageSource, RgbaImage};
use biome_core::BiomeError;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Finished = Rc<RefCell<Vec<(String, Result<RgbaImage, BiomeError>)>>>;

struct PendingImage {
    img: web::HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

/// Loads images through `<img>` and reads their pixels back via a 2D canvas.
#[derive(Default)]
pub struct HtmlImageSource {
    finished: Finished,
    pending: Vec<PendingImage>,
}

fn decode(img: &web::HtmlImageElement, url: &str) -> Result<RgbaImage, BiomeError> {
    let (width, height) = (img.natural_width(), img.natural_height());
    if width == 0 || height == 0 {
        return Err(BiomeError::asset(url, "image has no pixels"));
    }
    let document = crate::dom::window_document().ok_or_else(|| BiomeError::asset(url, "no document"))?;
    let canvas = document
        .create_element("canvas")
        .ok()
        .and_then(|el| el.dyn_into::<web::HtmlCanvasElement>().ok())
        .ok_or_else(|| BiomeError::asset(url, "cannot create decode canvas"))?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|c| c.dyn_into::<web::CanvasRenderingContext2d>().ok())
        .ok_or_else(|| BiomeError::asset(url, "no 2d context"))?;
    ctx.draw_image_with_html_image_element(img, 0.0, 0.0)
        .map_err(|e| BiomeError::asset(url, format!("{:?}", e)))?;
    let data = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(|e| BiomeError::asset(url, format!("{:?}", e)))?;
    Ok(RgbaImage {
        width,
        height,
        pixels: data.data().0,
    })
}

impl ImageSource for HtmlImageSource {
    fn request(&mut self, url: &str) -> Result<Option<RgbaImage>, BiomeError> {
        let img = web::HtmlImageElement::new()
            .map_err(|e| BiomeError::asset(url, format!("{:?}", e)))?;
        img.set_cross_origin(Some("anonymous"));

        let onload = {
            let finished = self.finished.clone();
            let img = img.clone();
            let url = url.to_string();
            Closure::wrap(Box::new(move || {
                let result = decode(&img, &url);
                finished.borrow_mut().push((url.clone(), result));
            }) as Box<dyn FnMut()>)
        };
        let onerror = {
            let finished = self.finished.clone();
            let url = url.to_string();
            Closure::wrap(Box::new(move || {
                finished
                    .borrow_mut()
                    .push((url.clone(), Err(BiomeError::asset(url.clone(), "image failed to load"))));
            }) as Box<dyn FnMut()>)
        };
        img.set_onload(Some(onload.as_ref().unchecked_ref()));
        img.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        img.set_src(url);

        self.pending.push(PendingImage {
            img,
            _onload: onload,
            _onerror: onerror,
        });
        Ok(None)
    }

    fn poll(&mut self) -> Vec<(String, Result<RgbaImage, BiomeError>)> {
        let done = std::mem::take(&mut *self.finished.borrow_mut());
        if !done.is_empty() {
            self.pending.retain(|p| {
                let url = p.img.src();
                let settled = done.iter().any(|(u, _)| url.ends_with(u.as_str()));
                if settled {
                    p.img.set_onload(None);
                    p.img.set_onerror(None);
                }
                !settled
            });
        }
        done
    }
}
