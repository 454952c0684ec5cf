use crate::constants::READOUT_ID;
use crate::readout::readout_text;
use magnitude_core::Readout;
use web_sys as web;

/// Write the readout line into `#readout` when the page has one.
pub fn update_readout(document: &web::Document, readout: &Readout) {
    if let Some(el) = document.get_element_by_id(READOUT_ID) {
        el.set_text_content(Some(&readout_text(readout)));
    }
}
