mod check;
mod support;
