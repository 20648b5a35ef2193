// Copyright 2026 the Pergola Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synthetic input session that exercises dispatch, hover, focus and frame
//! compositing.
//!
//! Builds a window with a toolbar frame and a floating, buffered popup, then
//! replays a short scripted session of pointer and key events. Trace events
//! go to both a [`PrettyPrintSink`](pergola_debug::pretty::PrettyPrintSink)
//! and a [`RecorderSink`](pergola_debug::recorder::RecorderSink); the
//! recording is exported as a Chrome trace at the end.

use std::fs::File;
use std::io::BufWriter;

use kurbo::{Insets, Point, Rect, Size, Vec2};

use pergola_core::config::WindowConfig;
use pergola_core::event::{
    ContextMenuEvent, HoverEvent, Key, KeyEvent, Modifiers, MouseButton, MouseEvent, Response,
};
use pergola_core::layout::{Alignment, LinearLayout, Orientation};
use pergola_core::render::{BufferId, ClipShape, RenderError, Renderer, Rgba8, StencilState};
use pergola_core::view::{DrawCx, FrameFlags, ViewCx, ViewFlags, ViewId, ViewTree};
use pergola_core::widget::Widget;

use pergola_debug::fanout::FanOutSink;
use pergola_debug::pretty::PrettyPrintSink;
use pergola_debug::recorder::RecorderSink;

const IDLE: Rgba8 = Rgba8::new(60, 60, 70, 255);
const HOT: Rgba8 = Rgba8::new(90, 120, 200, 255);
const PANEL: Rgba8 = Rgba8::new(30, 30, 34, 255);

/// A fixed-size button that lights up while hovered.
#[derive(Debug)]
struct Button {
    label: &'static str,
    hot: bool,
}

impl Button {
    fn new(label: &'static str) -> Self {
        Self { label, hot: false }
    }
}

impl Widget for Button {
    fn preferred_size(&self, _: &ViewTree, _: ViewId) -> Size {
        Size::new(80.0, 24.0)
    }

    fn draw(&self, cx: &mut DrawCx<'_>) -> Response {
        cx.fill(if self.hot { HOT } else { IDLE });
        Response::Ignore
    }

    fn mouse_press(&mut self, _: &mut ViewCx<'_>, _: &MouseEvent) -> Response {
        println!("  {} pressed", self.label);
        Response::Finish
    }

    fn mouse_release(&mut self, _: &mut ViewCx<'_>, _: &MouseEvent) -> Response {
        println!("  {} clicked", self.label);
        Response::Finish
    }

    fn key_press(&mut self, _: &mut ViewCx<'_>, event: &KeyEvent) -> Response {
        if event.key == Key::Enter {
            println!("  {} activated from the keyboard", self.label);
            return Response::Finish;
        }
        Response::Ignore
    }

    fn hover_in(&mut self, cx: &mut ViewCx<'_>, _: &HoverEvent) -> Response {
        self.hot = true;
        cx.request_refresh();
        Response::Ignore
    }

    fn hover_out(&mut self, cx: &mut ViewCx<'_>, _: &HoverEvent) -> Response {
        self.hot = false;
        cx.request_refresh();
        Response::Ignore
    }
}

/// A panel background that clips its children to its rounded outline.
#[derive(Debug)]
struct Panel;

impl Widget for Panel {
    fn draw(&self, cx: &mut DrawCx<'_>) -> Response {
        cx.fill(PANEL);
        let outline = cx.tree().shape(cx.id());
        cx.push_clip(outline);
        cx.draw_children();
        cx.pop_clip();
        Response::Finish
    }
}

/// A popup frame that closes itself on Escape.
#[derive(Debug)]
struct Popup;

impl Widget for Popup {
    fn draw(&self, cx: &mut DrawCx<'_>) -> Response {
        Panel.draw(cx)
    }

    fn key_press(&mut self, cx: &mut ViewCx<'_>, event: &KeyEvent) -> Response {
        if event.key != Key::Escape {
            return Response::Ignore;
        }
        println!("  popup closed");
        let id = cx.id();
        cx.destroy(id);
        Response::Finish
    }

    fn context_menu_press(&mut self, _: &mut ViewCx<'_>, _: &ContextMenuEvent) -> Response {
        Response::Finish
    }
}

/// Counts backend calls instead of drawing.
#[derive(Debug, Default)]
struct CountingRenderer {
    fills: usize,
    stencil_fills: usize,
    composites: usize,
    next_buffer: u32,
}

impl Renderer for CountingRenderer {
    fn set_stencil(&mut self, _: StencilState) {}

    fn fill_stencil(&mut self, _: &ClipShape) {
        self.stencil_fills += 1;
    }

    fn fill(&mut self, _: &ClipShape, _: Rgba8) {
        self.fills += 1;
    }

    fn create_buffer(&mut self, _: Size) -> Result<BufferId, RenderError> {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        Ok(id)
    }

    fn composite_buffer(&mut self, _: BufferId, _: Rect) {
        self.composites += 1;
    }
}

fn press(at: Point) -> MouseEvent {
    MouseEvent::new(at, MouseButton::Left)
}

fn draw(tree: &mut ViewTree, window: ViewId, renderer: &mut CountingRenderer) {
    *renderer = CountingRenderer {
        next_buffer: renderer.next_buffer,
        ..CountingRenderer::default()
    };
    match tree.draw(window, renderer) {
        Ok(report) => {
            let outcomes: Vec<String> = report
                .composites
                .iter()
                .map(|(frame, outcome)| format!("{frame:?}={outcome:?}"))
                .collect();
            println!(
                "  draw: {} fills, {} stencil fills, {} composites [{}]",
                renderer.fills,
                renderer.stencil_fills,
                renderer.composites,
                outcomes.join(", "),
            );
        }
        Err(e) => println!("  draw failed: {e}"),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // -- sinks -------------------------------------------------------------
    let recorder = RecorderSink::new();
    let recording = recorder.recording();

    let mut tree = ViewTree::new();
    tree.set_trace_sink(Box::new(
        FanOutSink::new()
            .with(PrettyPrintSink::new(Box::new(std::io::stdout())))
            .with(recorder),
    ));

    // -- scene -------------------------------------------------------------
    let window = tree.create_window(Size::new(640.0, 480.0), WindowConfig::desktop());

    let main_flags = FrameFlags {
        focusable: true,
        ..FrameFlags::default()
    };
    let main = tree.create_frame(Panel, main_flags);
    tree.add_frame(window, main)?;
    tree.set_child_geometry(window, main, Point::ZERO, Size::new(640.0, 480.0));

    let toolbar = tree.create_view(
        LinearLayout::new(Orientation::Horizontal)
            .with_spacing(8.0)
            .with_margin(Insets::uniform(6.0))
            .with_alignment(Alignment::Center),
    );
    tree.push_back(main, toolbar)?;
    let mut buttons = Vec::new();
    for label in ["open", "save", "close"] {
        let b = tree.create_view(Button::new(label));
        tree.set_flags(
            b,
            ViewFlags {
                focusable: true,
                ..ViewFlags::default()
            },
        );
        tree.push_back(toolbar, b)?;
        buttons.push(b);
    }
    tree.set_child_geometry(main, toolbar, Point::ZERO, Size::new(640.0, 36.0));

    let popup = tree.create_frame(
        Popup,
        FrameFlags {
            floating: true,
            focusable: true,
            ..FrameFlags::default()
        },
    );
    tree.add_frame(window, popup)?;
    tree.set_child_geometry(window, popup, Point::new(200.0, 120.0), Size::new(160.0, 90.0));
    let item = tree.create_view(Button::new("popup item"));
    tree.push_back(popup, item)?;
    tree.set_child_geometry(popup, item, Point::new(8.0, 8.0), Size::new(144.0, 24.0));

    let mut renderer = CountingRenderer::default();

    // -- session -----------------------------------------------------------
    println!("first draw");
    draw(&mut tree, window, &mut renderer);
    println!("unchanged redraw");
    draw(&mut tree, window, &mut renderer);

    let save = tree.position(buttons[1]) + Vec2::new(10.0, 10.0);
    println!("click `save`");
    tree.dispatch_mouse_move(window, &press(save))?;
    tree.dispatch_mouse_press(window, &press(save))?;
    tree.dispatch_mouse_release(window, &press(save))?;
    println!("focused view: {:?}", tree.focused_view(main)?);

    println!("enter on the focused button");
    tree.set_focused_frame(window, Some(main))?;
    tree.dispatch_key_press(window, &KeyEvent::new(Key::Enter))?;

    println!("hover the popup item");
    tree.dispatch_mouse_move(window, &press(Point::new(220.0, 140.0)))?;
    draw(&mut tree, window, &mut renderer);

    println!("context menu over the popup");
    tree.dispatch_context_menu_press(
        window,
        &ContextMenuEvent {
            position: Point::new(220.0, 140.0),
            modifiers: Modifiers::default(),
        },
    )?;

    println!("escape");
    tree.set_focused_frame(window, Some(popup))?;
    tree.dispatch_key_press(window, &KeyEvent::new(Key::Escape))?;
    println!("frames left: {}", tree.frames(window)?.len());
    draw(&mut tree, window, &mut renderer);

    // -- export Chrome trace -----------------------------------------------
    drop(tree.take_trace_sink());
    let path = "trace.json";
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    pergola_debug::chrome::export(&recording.to_bytes(), &mut writer)?;

    println!("Wrote {path} ({} bytes recorded)", recording.len());
    Ok(())
}
