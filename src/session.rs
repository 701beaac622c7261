//! Per-form tooltip and autofill state
//!
//! Models what happens to a form once it has been scanned: which inputs carry
//! the autofill icon, when the tooltip opens and closes, and how autofilled
//! values and their highlights evolve as the user interacts with the page.

use serde::Serialize;
use tracing::debug;

/// Edge length of the square autofill icon, in CSS pixels
pub const ICON_SIZE: f64 = 30.0;

/// An axis-aligned box in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive on every edge
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// Where the icon sits inside an input
pub struct IconBox;

impl IconBox {
    /// Vertically centred, flush with the input's inner right edge
    pub fn for_input(input: &Rect, padding_right: f64) -> Rect {
        let right = input.right() - padding_right;
        Rect {
            left: right - ICON_SIZE,
            top: input.top + (input.height - ICON_SIZE) / 2.0,
            width: ICON_SIZE,
            height: ICON_SIZE,
        }
    }
}

/// A pointer-down event as seen by an input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub x: f64,
    pub y: f64,
    /// Dispatched by the user agent, not by page script
    pub trusted: bool,
    pub primary_button: bool,
}

impl PointerDown {
    /// A trusted primary-button press at `(x, y)`
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            trusted: true,
            primary_button: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TooltipState {
    Hidden,
    Shown { input: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputState {
    pub value: String,
    pub touched: bool,
    pub decorated: bool,
    /// Carries the autofill highlight
    pub autofilled: bool,
}

/// Interaction state of one form
#[derive(Debug, Clone, Serialize)]
pub struct FormSession {
    engaged: bool,
    inputs: Vec<InputState>,
    tooltip: TooltipState,
}

impl FormSession {
    /// Inputs are decorated right away when the form is engaged
    pub fn new(input_count: usize, engaged: bool) -> Self {
        let inputs = (0..input_count)
            .map(|_| InputState {
                decorated: engaged,
                ..InputState::default()
            })
            .collect();
        Self {
            engaged,
            inputs,
            tooltip: TooltipState::Hidden,
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn tooltip(&self) -> TooltipState {
        self.tooltip
    }

    pub fn input(&self, index: usize) -> Option<&InputState> {
        self.inputs.get(index)
    }

    pub fn inputs(&self) -> &[InputState] {
        &self.inputs
    }

    pub fn all_inputs_empty(&self) -> bool {
        self.inputs.iter().all(|i| i.value.is_empty())
    }

    /// Handle a pointer-down on input `index` whose box is `rect`.
    /// Returns whether the tooltip was opened.
    pub fn pointer_down(&mut self, index: usize, event: PointerDown, rect: &Rect, padding_right: f64) -> bool {
        if !event.trusted || !event.primary_button {
            return false;
        }
        let all_empty = self.all_inputs_empty();
        let Some(input) = self.inputs.get_mut(index) else {
            return false;
        };
        if !input.decorated {
            return false;
        }

        let on_icon = IconBox::for_input(rect, padding_right).contains(event.x, event.y);
        let opens = (!input.touched && all_empty) || on_icon;
        input.touched = true;

        if opens {
            debug!(input = index, on_icon, "tooltip shown");
            self.tooltip = TooltipState::Shown { input: index };
        }
        opens
    }

    /// A pointer-down anywhere outside the tooltip
    pub fn pointer_down_outside(&mut self) {
        self.hide();
    }

    /// The pointer left the viewport
    pub fn viewport_left(&mut self) {
        self.hide();
    }

    pub fn scrolled(&mut self) {
        self.hide();
    }

    fn hide(&mut self) {
        if self.tooltip != TooltipState::Hidden {
            debug!("tooltip hidden");
        }
        self.tooltip = TooltipState::Hidden;
    }

    /// Write values into the inputs, highlight them and close the tooltip.
    /// `value_for` maps an input index to its value; inputs without one are left alone.
    pub fn autofill<F>(&mut self, mut value_for: F)
    where
        F: FnMut(usize) -> Option<String>,
    {
        for (index, input) in self.inputs.iter_mut().enumerate() {
            if let Some(value) = value_for(index) {
                input.value = value;
                input.autofilled = true;
            }
        }
        self.hide();
    }

    /// The user typed into input `index`. A trusted edit drops every highlight.
    pub fn edit(&mut self, index: usize, value: &str, trusted: bool) {
        if let Some(input) = self.inputs.get_mut(index) {
            input.value = value.to_string();
        }
        if trusted && self.inputs.iter().any(|i| i.autofilled) {
            debug!(input = index, "user edit, removing highlights");
            for input in &mut self.inputs {
                input.autofilled = false;
            }
        }
    }

    /// Clear values and highlights
    pub fn reset(&mut self) {
        for input in &mut self.inputs {
            input.value.clear();
            input.autofilled = false;
        }
    }

    /// Remove all decorations and close the tooltip
    pub fn logout(&mut self) {
        for input in &mut self.inputs {
            input.decorated = false;
        }
        self.hide();
    }
}
