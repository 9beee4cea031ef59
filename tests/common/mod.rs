#![allow(dead_code)]

pub mod sfm_fixture;
pub mod synthetic_image;
