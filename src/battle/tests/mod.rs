pub mod common;




#[cfg(test)]
mod test_reset;



#[cfg(test)]
mod test_properties;
