// HTML front end: upload form and result pages

pub mod handlers;
